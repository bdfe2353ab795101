//! Drive `Console` over real HTTP against the mock server.

use std::io::{Read, Write};
use std::net::SocketAddr;
use std::time::Duration;

use admin_console::{Console, ConsoleError};
use admin_core::{
    ClientConfig, Gender, LoginParams, TokenStore, UpdateUser, UserParams, UserQuery,
};
use mock_server::ServerConfig;

fn start_server(config: ServerConfig) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, config).await
        })
        .unwrap();
    });
    addr
}

fn client_config(addr: SocketAddr) -> ClientConfig {
    ClientConfig {
        timeout: Duration::from_secs(5),
        ..ClientConfig::new(&format!("http://{addr}/api"))
    }
}

fn admin() -> LoginParams {
    LoginParams {
        account: mock_server::SEED_ACCOUNT.to_string(),
        password: mock_server::SEED_PASSWORD.to_string(),
    }
}

#[test]
fn login_persists_token_and_manages_users() {
    let addr = start_server(ServerConfig::default());
    let dir = tempfile::tempdir().unwrap();
    let console = Console::connect(&client_config(addr), dir.path());
    assert!(!console.is_authenticated());

    let err = console
        .login(&LoginParams {
            account: "admin".to_string(),
            password: "not-the-password".to_string(),
        })
        .unwrap_err();
    assert_eq!(err.notification(), "Account or Password is incorrect");
    assert!(!console.is_authenticated());

    console.login(&admin()).unwrap();
    assert!(console.is_authenticated());
    assert!(dir.path().join("__TOKEN__").exists());

    let created = console
        .create_user(&UserParams {
            name: "Console User".to_string(),
            gender: Gender::Male,
            account: "cuser".to_string(),
            password: None,
            mobile_phone: "555-0111".to_string(),
            birthday: "1999-09-09".to_string(),
            enabled: true,
        })
        .unwrap();

    let updated = console
        .update_user(
            &created.id,
            &UpdateUser {
                enabled: Some(false),
                ..UpdateUser::default()
            },
        )
        .unwrap();
    assert!(!updated.enabled);

    let page = console.list_users(&UserQuery::default()).unwrap();
    assert_eq!(page.total, 2);

    console.delete_user(&created.id).unwrap();
    let err = console.delete_user(&created.id).unwrap_err();
    assert!(matches!(err, ConsoleError::Api(_)));
    assert!(console.is_authenticated());

    // A fresh console over the same directory picks up the persisted token.
    let reopened = Console::connect(&client_config(addr), dir.path());
    assert_eq!(reopened.list_users(&UserQuery::default()).unwrap().total, 1);

    console.logout().unwrap();
    assert!(!reopened.is_authenticated());
}

#[test]
fn expired_token_is_cleared() {
    let addr = start_server(ServerConfig {
        token_ttl: Duration::ZERO,
    });
    let dir = tempfile::tempdir().unwrap();
    let console = Console::connect(&client_config(addr), dir.path());

    console.login(&admin()).unwrap();
    assert!(console.store().get().is_some());

    let err = console.list_users(&UserQuery::default()).unwrap_err();
    assert!(matches!(err, ConsoleError::SessionExpired(_)));
    assert!(!console.is_authenticated());
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let console = Console::connect(&client_config(addr), dir.path());
    let err = console.list_users(&UserQuery::default()).unwrap_err();
    assert!(matches!(err, ConsoleError::Transport(_)));
}

#[test]
fn truncated_body_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = [0u8; 1024];
        let _ = stream.read(&mut request);
        // Promise 100 bytes, send 7, hang up.
        stream
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\n{\"data\"")
            .unwrap();
    });

    let dir = tempfile::tempdir().unwrap();
    let console = Console::connect(&client_config(addr), dir.path());
    let err = console.list_users(&UserQuery::default()).unwrap_err();
    assert!(matches!(err, ConsoleError::Transport(_)), "{err:?}");
}
