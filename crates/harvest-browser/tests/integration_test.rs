use harvest_browser::{
    BrowserDriver, ChromiumDriver, FingerprintConfig, LaunchOptions, NavigateOptions, WaitUntil,
};
use std::time::Duration;

fn launch_options() -> LaunchOptions {
    LaunchOptions {
        fingerprint: FingerprintConfig::randomized(),
        headless: true,
        extra_args: vec!["--disable-setuid-sandbox".to_string()],
    }
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_chromium_session_launch_and_close() {
    let mut session = ChromiumDriver::new()
        .launch(&launch_options())
        .await
        .expect("chromium should launch");

    assert!(session.close().await.is_ok());
    // Second close is a no-op
    assert!(session.close().await.is_ok());
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed and network access
async fn test_chromium_navigation_and_capture() {
    let mut session = ChromiumDriver::new()
        .launch(&launch_options())
        .await
        .unwrap();

    session
        .navigate(
            "https://example.com",
            NavigateOptions::new(Duration::from_secs(30)).wait_until(WaitUntil::NetworkIdle),
        )
        .await
        .expect("navigation failed");

    session
        .wait_for_selector("h1", Duration::from_secs(5))
        .await
        .expect("heading should render");

    let page = session.capture().await.unwrap();
    assert!(page.visible_text.contains("Example Domain"));
    assert!(!page.anchor_hrefs.is_empty());

    session.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_chromium_navigation_timeout() {
    let mut session = ChromiumDriver::new()
        .launch(&launch_options())
        .await
        .unwrap();

    // Non-routable address never answers
    let result = session
        .navigate(
            "http://10.255.255.1/",
            NavigateOptions::new(Duration::from_millis(500)),
        )
        .await;
    assert!(result.is_err());

    session.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_dom_content_loaded_does_not_wait_for_subresources() {
    let mut session = ChromiumDriver::new()
        .launch(&launch_options())
        .await
        .unwrap();

    // The image never loads, so the load event never fires
    let url = "data:text/html,<html><body><p>Parsed</p>\
               <img%20src='http://10.255.255.1/slow.png'></body></html>";

    session
        .navigate(url, NavigateOptions::new(Duration::from_secs(5)))
        .await
        .expect("DOM should be ready before the image loads");
    let page = session.capture().await.unwrap();
    assert!(page.visible_text.contains("Parsed"));

    let full_load = session
        .navigate(
            url,
            NavigateOptions::new(Duration::from_secs(2)).wait_until(WaitUntil::NetworkIdle),
        )
        .await;
    assert!(full_load.is_err());

    session.close().await.unwrap();
}
