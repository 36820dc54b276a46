//! Client context flows with a scripted tunnel

use vlessconn_core::{
    AppSettings, ConnectionManager, ConnectionStatus, MemoryStore, ProfileStore, ScriptedTunnel,
    TunnelEvent, VpnClient,
};

const LINKS: &str = "\
# exported servers
vless://id-fra@fra.example.com:443?reality=1&pbk=KEY&sni=www.example.com&sid=01&fp=chrome#Frankfurt
vless://id-ams@ams.example.com:8443

http://not-a-vless-link:443
vless://id-bad@bad.example.com:70000
";

fn client_with(
    tunnel: ScriptedTunnel,
    settings: AppSettings,
) -> (MemoryStore, VpnClient<MemoryStore, ScriptedTunnel>) {
    let backing = MemoryStore::new();
    let client = VpnClient::new(
        ProfileStore::new(backing.clone()),
        ConnectionManager::new(tunnel),
        settings,
    );
    (backing, client)
}

#[test]
fn import_adds_valid_links_in_order() {
    let (backing, mut client) = client_with(ScriptedTunnel::new(), AppSettings::default());
    let summary = client.import_links(LINKS).unwrap();

    assert_eq!(summary.added.len(), 2);
    assert_eq!(summary.skipped.len(), 2);
    assert_eq!(summary.skipped[0].link, "http://not-a-vless-link:443");
    assert!(summary.skipped[1].reason.contains("70000"));

    let names: Vec<_> = client
        .store()
        .profiles()
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["Frankfurt", "ams.example.com:8443"]);

    let mut reloaded = ProfileStore::new(backing);
    reloaded.load().unwrap();
    assert_eq!(reloaded.len(), 2);
    assert!(reloaded.profiles()[0].is_reality_enabled());
}

#[tokio::test]
async fn connect_passes_kill_switch_setting() {
    let tunnel = ScriptedTunnel::new();
    let settings = AppSettings {
        kill_switch: true,
        ..AppSettings::default()
    };
    let (_, mut client) = client_with(tunnel.clone(), settings);
    let id = client
        .add_from_uri("fra", "vless://id@fra.example.com:443")
        .unwrap();

    client.connect(id).await.unwrap();
    assert_eq!(client.store().selected(), Some(id));
    assert_eq!(tunnel.connected_profiles(), vec![id]);
    assert!(tunnel.last_options().unwrap().kill_switch);

    let state = client.connection_state();
    assert_eq!(state.status, ConnectionStatus::Connected);
    assert_eq!(state.active_profile, Some(id));
}

#[tokio::test]
async fn deleting_active_profile_disconnects_and_clears() {
    let tunnel = ScriptedTunnel::new();
    let (_, mut client) = client_with(tunnel.clone(), AppSettings::default());
    let id = client
        .add_from_uri("fra", "vless://id@fra.example.com:443")
        .unwrap();
    client.connect(id).await.unwrap();

    let outcome = client.delete_profile(id).await.unwrap();
    assert!(outcome.removed);
    assert!(outcome.selection_cleared);
    assert_eq!(tunnel.disconnect_count(), 1);

    let state = client.connection_state();
    assert_eq!(state.status, ConnectionStatus::Disconnected);
    assert!(state.active_profile.is_none());
}

#[tokio::test]
async fn deleting_other_profile_keeps_connection() {
    let tunnel = ScriptedTunnel::new();
    let (_, mut client) = client_with(tunnel.clone(), AppSettings::default());
    let active = client
        .add_from_uri("fra", "vless://id@fra.example.com:443")
        .unwrap();
    let other = client.add_manual("ams", "ams.example.com", 443, "id2").unwrap();
    client.connect(active).await.unwrap();

    client.delete_profile(other).await.unwrap();
    assert_eq!(tunnel.disconnect_count(), 0);
    assert_eq!(client.connection_state().active_profile, Some(active));
}

#[tokio::test]
async fn deleting_failed_target_clears_reference_without_tunnel() {
    let tunnel = ScriptedTunnel::new().with_connect_events(vec![
        TunnelEvent::Connecting,
        TunnelEvent::Failed("refused".to_string()),
    ]);
    let (_, mut client) = client_with(tunnel.clone(), AppSettings::default());
    let id = client
        .add_from_uri("fra", "vless://id@fra.example.com:443")
        .unwrap();
    assert!(client.connect(id).await.is_err());
    assert_eq!(client.connection_state().active_profile, Some(id));

    client.delete_profile(id).await.unwrap();
    assert!(client.connection_state().active_profile.is_none());
    assert_eq!(tunnel.disconnect_count(), 0);
}

#[tokio::test]
async fn update_keeps_identity_and_reality() {
    let (_, mut client) = client_with(ScriptedTunnel::new(), AppSettings::default());
    let id = client
        .add_from_uri(
            "fra",
            "vless://id@fra.example.com:443?reality=1&pbk=KEY&sni=www.example.com",
        )
        .unwrap();
    let created_at = client.store().get(id).unwrap().created_at;

    assert!(
        client
            .update_profile(id, "Frankfurt 2", "fra2.example.com", 2053, "id2")
            .unwrap()
    );
    let stored = client.store().get(id).unwrap();
    assert_eq!(stored.created_at, created_at);
    assert_eq!(
        stored.raw_uri,
        "vless://id2@fra2.example.com:2053?reality=1&pbk=KEY&sni=www.example.com"
    );
}

#[tokio::test]
async fn reset_disconnects_and_clears_everything() {
    let tunnel = ScriptedTunnel::new();
    let (backing, mut client) = client_with(tunnel.clone(), AppSettings::default());
    client.import_links(LINKS).unwrap();
    let first = client.store().profiles()[0].id;
    client.connect(first).await.unwrap();

    client.reset().await.unwrap();
    assert!(client.store().is_empty());
    assert_eq!(client.connection_state().status, ConnectionStatus::Disconnected);

    let mut reloaded = ProfileStore::new(backing);
    reloaded.load().unwrap();
    assert!(reloaded.is_empty());
}

#[tokio::test]
async fn tunnel_drop_is_observed_after_connect() {
    let tunnel = ScriptedTunnel::new();
    let (_, mut client) = client_with(tunnel.clone(), AppSettings::default());
    let id = client
        .add_from_uri("fra", "vless://id@fra.example.com:443")
        .unwrap();
    client.connect(id).await.unwrap();

    tunnel.inject(TunnelEvent::Failed("network unreachable".to_string()));
    assert_eq!(
        client.poll_connection().await,
        Some(ConnectionStatus::Error("network unreachable".to_string()))
    );

    // reconnecting from the error state is allowed
    client.connect(id).await.unwrap();
    assert_eq!(client.connection_state().status, ConnectionStatus::Connected);
}
