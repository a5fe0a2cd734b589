use axum::body::{Body, to_bytes};
use axum::http::{Request, header};
use tower::ServiceExt;

use super::*;
use crate::fixtures::dataset;
use crate::model::{ChangeModel, ModelConfig};
use crate::report::volcano::PLOTLY_CDN;

fn app() -> Router {
    let model = ChangeModel::new(ModelConfig::default().change_params()).unwrap();
    router(Arc::new(AppContext::new(dataset(true), Box::new(model))))
}

fn url_encode(raw: &str) -> String {
    let mut out = String::new();
    for b in raw.bytes() {
        if b.is_ascii_alphanumeric() || b"-_.~".contains(&b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

fn submit_request(fields: &[(&str, &str)]) -> Request<Body> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{k}={}", url_encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    Request::builder()
        .method("POST")
        .uri("/submit")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(resp: Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_home_page() {
    let resp = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8_lossy(&bytes);
    assert!(page.contains("id=\"group1\""));
    // The plot fragment from /submit relies on plotly.js loaded up front.
    let head_end = page.find("</head>").unwrap();
    assert!(page[..head_end].contains(&format!("<script src=\"{PLOTLY_CDN}\"></script>")));
    assert!(!page.contains(PLOTLY_SLOT));
}

#[tokio::test]
async fn test_catalog_route() {
    let resp = app()
        .oneshot(Request::builder().uri("/tables/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["data"][0]["label"], "B cell");
    assert_eq!(json["data"][1]["index"], 1);
    assert_eq!(json["data"][0]["display"], "B cell");
    assert_eq!(json["columns"][0]["data"], "display");
    assert_eq!(json["columns"][0]["title"], "Cell Type");
}

#[tokio::test]
async fn test_submit_success() {
    let resp = app()
        .oneshot(submit_request(&[
            ("data1", r#"[{"row":0}]"#),
            ("data2", r#"[{"row":1}]"#),
            ("genes", r#""GENE1\nCD3E""#),
        ]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["title"], "B cell versus T cell");
    assert_eq!(json["dejsondata"]["data"].as_array().unwrap().len(), 3);
    assert_eq!(json["dejsondata"]["columns"][0]["data"], "Gene ID");
    assert!(json["deplothtml"].as_str().unwrap().contains("Plotly.newPlot"));
}

#[tokio::test]
async fn test_submit_out_of_range_is_client_error() {
    let resp = app()
        .oneshot(submit_request(&[
            ("data1", r#"[{"row":0}]"#),
            ("data2", r#"[{"row":2}]"#),
        ]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(resp).await;
    assert!(json["error"].as_str().unwrap().contains("out of range"));
}

#[tokio::test]
async fn test_submit_missing_field_is_bad_request() {
    let resp = app()
        .oneshot(submit_request(&[("data1", r#"[{"row":0}]"#)]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_empty_group_is_server_error() {
    let resp = app()
        .oneshot(submit_request(&[("data1", "[]"), ("data2", r#"[{"row":1}]"#)]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(resp).await;
    assert!(json["error"].as_str().unwrap().contains("selects no cells"));
}
