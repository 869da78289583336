//! Integration tests for the admin login, dashboard, upload and logout flow.

mod common;

use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn dashboard_requires_login() {
    let app = TestApp::new();

    let response = app.get("/admin/dashboard", None).await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/admin"));
}

#[tokio::test]
async fn wrong_password_redirects_with_error_flag() {
    let app = TestApp::new();

    let response = app.post_login("not-the-password").await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/admin?error=1"));
    assert!(response.session_cookie().is_none());
}

#[tokio::test]
async fn unset_admin_password_disables_login() {
    let app = TestApp::with_config(|config| config.security.admin_password = None);

    for password in ["", "admin", common::ADMIN_PASSWORD] {
        let response = app.post_login(password).await;
        assert_eq!(response.location(), Some("/admin?error=1"));
    }
}

#[tokio::test]
async fn login_page_renders_error_block() {
    let app = TestApp::new();

    let plain = app.get("/admin", None).await;
    assert_eq!(plain.status, StatusCode::OK);
    assert!(plain.text().contains("name=\"password\""));
    assert!(!plain.text().contains("Contraseña incorrecta"));

    let failed = app.get("/admin?error=1", None).await;
    assert_eq!(failed.status, StatusCode::OK);
    assert!(failed.text().contains("Contraseña incorrecta"));
}

#[tokio::test]
async fn session_cookie_is_scoped_and_short_lived() {
    let app = TestApp::new();

    let response = app.post_login(common::ADMIN_PASSWORD).await;
    assert_eq!(response.location(), Some("/admin/dashboard"));

    let cookie = response.set_cookie().expect("login should set a cookie");
    let attributes: Vec<&str> = cookie.split(';').map(str::trim).collect();
    assert!(attributes[0].starts_with("soporte_remoto_sid="));
    assert!(attributes.contains(&"HttpOnly"));
    assert!(attributes.contains(&"SameSite=Lax"));
    assert!(attributes.contains(&"Path=/"));
    assert!(!attributes.contains(&"Secure"));

    let max_age: i64 = attributes
        .iter()
        .find_map(|attr| attr.strip_prefix("Max-Age="))
        .expect("cookie should carry Max-Age")
        .parse()
        .expect("Max-Age should be numeric");
    assert!(
        (7_100..=7_200).contains(&max_age),
        "unexpected Max-Age {max_age}"
    );
}

#[tokio::test]
async fn admin_session_reaches_dashboard() {
    let app = TestApp::new();
    app.put_file("soporte-remoto-windows.exe", &[0u8; 2048]);
    let cookie = app.login().await;

    let response = app.get("/admin/dashboard", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);

    let html = response.text();
    assert!(html.contains("soporte-remoto-windows.exe"));
    assert!(html.contains("2.0 KB"));
    assert!(html.contains("Disponible"));
    assert!(html.contains("Faltante"));
    assert!(html.contains("action=\"/admin/upload\""));

    let windows = html.find("<code>soporte-remoto-windows.exe</code>");
    let macos = html.find("<code>soporte-remoto-macos.dmg</code>");
    let linux = html.find("<code>soporte-remoto-linux.sh</code>");
    let android = html.find("<code>soporte-remoto-android.apk</code>");
    assert!(windows.is_some() && windows < macos && macos < linux && linux < android);

    let login_page = app.get("/admin", Some(&cookie)).await;
    assert_eq!(login_page.status, StatusCode::FOUND);
    assert_eq!(login_page.location(), Some("/admin/dashboard"));
}

#[tokio::test]
async fn logout_revokes_session() {
    let app = TestApp::new();
    let cookie = app.login().await;
    assert_eq!(
        app.get("/admin/dashboard", Some(&cookie)).await.status,
        StatusCode::OK
    );

    let response = app.post("/admin/logout", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/admin"));

    let retry = app.get("/admin/dashboard", Some(&cookie)).await;
    assert_eq!(retry.status, StatusCode::FOUND);
    assert_eq!(retry.location(), Some("/admin"));
}

#[tokio::test]
async fn logout_without_session_still_redirects() {
    let app = TestApp::new();

    let response = app.post("/admin/logout", None).await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/admin"));
}

#[tokio::test]
async fn uploaded_installer_is_downloadable() {
    let app = TestApp::new();
    let cookie = app.login().await;
    let contents = b"#!/bin/sh\necho soporte remoto\n";

    let response = app
        .upload("soporte-remoto-linux.sh", contents, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/admin/dashboard?success=1"));

    let download = app.get("/download/linux", None).await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(&download.body[..], contents);

    let dashboard = app
        .get("/admin/dashboard?success=1", Some(&cookie))
        .await
        .text();
    assert!(dashboard.contains("Archivo subido correctamente"));

    let empty_flag = app
        .get("/admin/dashboard?success=", Some(&cookie))
        .await
        .text();
    assert!(!empty_flag.contains("Archivo subido correctamente"));
}

#[tokio::test]
async fn upload_replaces_previous_file() {
    let app = TestApp::new();
    app.put_file("soporte-remoto-macos.dmg", b"old build");
    let cookie = app.login().await;

    let response = app
        .upload("soporte-remoto-macos.dmg", b"new build", Some(&cookie))
        .await;
    assert_eq!(response.location(), Some("/admin/dashboard?success=1"));

    let stored = std::fs::read(app.storage_path("soporte-remoto-macos.dmg")).unwrap();
    assert_eq!(stored, b"new build");
    let entries = std::fs::read_dir(&app.config.storage.root).unwrap().count();
    assert_eq!(entries, 1);
}

#[tokio::test]
async fn upload_with_unlisted_name_is_rejected() {
    let app = TestApp::new();
    let cookie = app.login().await;

    for name in ["payload.sh", "SOPORTE-REMOTO-LINUX.SH", "../soporte-remoto-linux.sh"] {
        let response = app.upload(name, b"data", Some(&cookie)).await;
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.location(), Some("/admin/dashboard?error=upload"));
    }

    let entries = std::fs::read_dir(&app.config.storage.root).unwrap().count();
    assert_eq!(entries, 0);

    let dashboard = app
        .get("/admin/dashboard?error=upload", Some(&cookie))
        .await
        .text();
    assert!(dashboard.contains("Error al subir"));
}

#[tokio::test]
async fn oversized_upload_keeps_existing_file() {
    let app = TestApp::with_config(|config| config.storage.max_upload_bytes = 1024);
    app.put_file("soporte-remoto-android.apk", b"stable build");
    let cookie = app.login().await;

    let response = app
        .upload("soporte-remoto-android.apk", &[1u8; 4096], Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/admin/dashboard?error=upload"));

    let stored = std::fs::read(app.storage_path("soporte-remoto-android.apk")).unwrap();
    assert_eq!(stored, b"stable build");
    let entries = std::fs::read_dir(&app.config.storage.root).unwrap().count();
    assert_eq!(entries, 1);
}

#[tokio::test]
async fn upload_requires_admin_session() {
    let app = TestApp::new();

    let response = app.upload("soporte-remoto-linux.sh", b"data", None).await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/admin"));
    assert!(!app.storage_path("soporte-remoto-linux.sh").exists());
}

#[tokio::test]
async fn repeated_failed_logins_are_rate_limited() {
    let app = TestApp::new();

    let mut limited = None;
    for _ in 0..11 {
        let response = app.post_login("wrong").await;
        assert_eq!(response.location(), Some("/admin?error=1"));
        if response.headers.contains_key("retry-after") {
            limited = Some(response);
            break;
        }
    }

    assert!(limited.is_some(), "eleventh attempt should carry Retry-After");
}

#[tokio::test]
async fn forwarded_clients_are_limited_separately() {
    let app = TestApp::new();

    for n in 1..=10 {
        let client = format!("198.51.100.{n}");
        let response = app.post_login_via("wrong", Some(&client)).await;
        assert!(!response.headers.contains_key("retry-after"));
    }

    let response = app
        .post_login_via(common::ADMIN_PASSWORD, Some("203.0.113.50"))
        .await;
    assert_eq!(response.location(), Some("/admin/dashboard"));
}

#[tokio::test]
async fn forwarded_header_from_untrusted_peer_is_ignored() {
    let app = TestApp::with_config(|config| config.security.trusted_proxies.clear());

    let mut limited = false;
    for n in 1..=11 {
        let client = format!("198.51.100.{n}");
        let response = app.post_login_via("wrong", Some(&client)).await;
        limited |= response.headers.contains_key("retry-after");
    }

    assert!(limited, "spoofed forwarded addresses should share the peer's bucket");
}
