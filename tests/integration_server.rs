use std::sync::Arc;

use device_view::config::Config;
use device_view::detect::KeywordClassifier;
use device_view::server::DeviceViewServer;
use reqwest::redirect::Policy;
use reqwest::Client;

const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
    AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

async fn spawn_server(config: Config) -> String {
    let mut config = config;
    config.server.bind_addr = "127.0.0.1:0".to_string();

    let classifier = Arc::new(KeywordClassifier::new().unwrap());
    // Bind before spawning so the port is known and ready.
    let server = DeviceViewServer::bind(Arc::new(config), classifier)
        .await
        .expect("Failed to bind");
    let base_url = format!("http://{}", server.addr);

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    base_url
}

fn client() -> Client {
    Client::builder().redirect(Policy::none()).build().unwrap()
}

#[tokio::test]
async fn test_health_integration() {
    let base_url = spawn_server(Config::default()).await;

    let resp = client()
        .get(format!("{base_url}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "device-view");
}

#[tokio::test]
async fn test_real_iphone_gets_mobile_cookie() {
    let base_url = spawn_server(Config::default()).await;

    let resp = client()
        .get(format!("{base_url}/"))
        .header("user-agent", IPHONE)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let cookie = resp.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(cookie.starts_with("device_view=mobile;"));
    assert!(resp.text().await.unwrap().contains("<h1>mobile view</h1>"));
}

#[tokio::test]
async fn test_switch_param_redirects_back_without_param() {
    let base_url = spawn_server(Config::default()).await;

    let resp = client()
        .get(format!("{base_url}/some/parameters?device_view=tablet&q=1"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(
        resp.headers()["location"].to_str().unwrap(),
        format!("{base_url}/some/parameters?q=1")
    );
    assert!(resp.headers()["set-cookie"]
        .to_str()
        .unwrap()
        .starts_with("device_view=tablet;"));
}
