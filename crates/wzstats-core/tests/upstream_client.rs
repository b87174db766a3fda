//! Upstream client against a mock HTTP server.

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wzstats_core::{GulagResult, RetryConfig, StatsError, StatsSource, UpstreamClient, UpstreamConfig};

const STATS_PATH: &str = "/stats/cod/v1/title/mw/platform/psn/gamer/alice/profile/type/wz";
const MATCHES_PATH: &str =
    "/crm/cod/v2/title/mw/platform/psn/gamer/alice/matches/wz/start/0/end/0/details";

fn fast_retry() -> RetryConfig {
    RetryConfig::new()
        .with_max_attempts(2)
        .with_base_delay(Duration::from_millis(10))
        .with_jitter(false)
}

fn client_for(server: &MockServer, token: &str) -> UpstreamClient {
    let config = UpstreamConfig::new(server.uri(), token).with_retry(fast_retry());
    UpstreamClient::new(config).unwrap()
}

fn profile_body() -> serde_json::Value {
    json!({
        "status": "success",
        "data": {
            "level": 155,
            "prestige": "3",
            "lifetime": {
                "all": {
                    "properties": {
                        "kills": 1500.0,
                        "deaths": 500,
                        "kdRatio": 3.0,
                        "wins": "12",
                        "wlRatio": 0.04,
                        "scorePerMinute": null,
                        "topFive": 80
                    }
                },
                "mode": {
                    "br": { "properties": { "kills": 900, "gamesPlayed": 40 } },
                    "plunder": "garbage"
                }
            }
        }
    })
}

#[tokio::test]
async fn test_stats_sent_with_session_cookie_and_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .and(header("cookie", "ACT_SSO_COOKIE=sso-one"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "sso-one");
    let stats = client.fetch_player_stats("psn", "alice", "wz").await.unwrap();

    assert_eq!(stats.platform, "psn");
    assert_eq!(stats.gamertag, "alice");
    assert_eq!(stats.level, 155);
    assert_eq!(stats.prestige, 3);
    assert_eq!(stats.kills, 1500);
    assert_eq!(stats.deaths, 500);
    assert_eq!(stats.wins, 12);
    assert_eq!(stats.top_five, 80);
    assert_eq!(stats.score_per_min, 0.0);
    assert_eq!(stats.modes["br"].kills, 900);
    assert_eq!(stats.modes["br"].matches_played, 40);
    assert_eq!(stats.modes["plunder"].kills, 0);
}

#[tokio::test]
async fn test_empty_mode_requests_default_mode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "sso");
    assert!(client.fetch_player_stats("psn", "alice", "").await.is_ok());
}

#[tokio::test]
async fn test_matches_decoded_with_gulag_outcome() {
    let server = MockServer::start().await;
    let body = json!({
        "status": "success",
        "data": {
            "matches": [
                {
                    "matchID": "111",
                    "mode": "br_brquads",
                    "map": "mp_don4",
                    "duration": 1500000,
                    "utcStartSeconds": 1700000000,
                    "playerStats": {
                        "kills": 7, "deaths": 2, "kdRatio": 3.5,
                        "damageDone": 2100, "damageTaken": 900,
                        "teamPlacement": 3, "gulagKills": 1
                    }
                },
                {
                    "matchID": 222,
                    "playerStats": { "gulagDeaths": 1 }
                },
                { "matchID": "333", "playerStats": "missing" }
            ]
        }
    });
    Mock::given(method("GET"))
        .and(path(MATCHES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = client_for(&server, "sso");
    let matches = client.fetch_recent_matches("psn", "alice").await.unwrap();

    assert_eq!(matches.len(), 3);
    assert_eq!(matches[0].match_id, "111");
    assert_eq!(matches[0].placement, 3);
    assert_eq!(matches[0].damage_dealt, 2100);
    assert_eq!(matches[0].gulag_result, Some(GulagResult::Win));
    assert_eq!(matches[0].match_time.timestamp(), 1_700_000_000);
    assert_eq!(matches[1].match_id, "222");
    assert_eq!(matches[1].gulag_result, Some(GulagResult::Loss));
    assert_eq!(matches[2].gulag_result, None);
    assert_eq!(matches[2].kills, 0);
}

#[tokio::test]
async fn test_status_codes_are_classified_without_retry() {
    let cases = [
        (401, StatsError::TokenExpired),
        (403, StatsError::PrivateProfile),
        (404, StatsError::PlayerNotFound),
        (429, StatsError::RateLimited),
        (503, StatsError::ApiUnavailable),
    ];

    for (status, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, "sso");
        let error = client.fetch_player_stats("psn", "alice", "wz").await.unwrap_err();
        assert_eq!(error, expected, "status {}", status);
    }
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/login", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, "sso");
    let error = client.fetch_player_stats("psn", "alice", "wz").await.unwrap_err();
    assert_eq!(error, StatsError::TokenExpired);
}

#[tokio::test]
async fn test_html_login_page_means_expired_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("\n  <!DOCTYPE html><html><body>Sign in</body></html>"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, "sso");
    let error = client.fetch_recent_matches("psn", "alice").await.unwrap_err();
    assert_eq!(error, StatsError::TokenExpired);
}

#[tokio::test]
async fn test_error_envelope_is_classified_by_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "data": { "type": "error", "message": "Not permitted: user not found for given params" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, "sso");
    let error = client.fetch_player_stats("psn", "alice", "wz").await.unwrap_err();
    assert_eq!(error, StatsError::PlayerNotFound);
}

#[tokio::test]
async fn test_unrecognised_status_keeps_body_excerpt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(418).set_body_string("short and stout"))
        .mount(&server)
        .await;

    let client = client_for(&server, "sso");
    let error = client.fetch_player_stats("psn", "alice", "wz").await.unwrap_err();
    assert_eq!(
        error,
        StatsError::UpstreamUnclassified {
            status: 418,
            excerpt: "short and stout".to_string(),
        }
    );
}

#[tokio::test]
async fn test_rotated_credential_used_on_next_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("cookie", "ACT_SSO_COOKIE=old"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("cookie", "ACT_SSO_COOKIE=new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(&server)
        .await;

    let client = client_for(&server, "old");
    let error = client.fetch_player_stats("psn", "alice", "wz").await.unwrap_err();
    assert!(error.is_credential_problem());

    client.rotate_credential("new".to_string()).await;
    assert_eq!(client.credential().current().await, "new");
    assert!(client.fetch_player_stats("psn", "alice", "wz").await.is_ok());
}

#[tokio::test]
async fn test_unreachable_upstream_is_unavailable() {
    // Bind then drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = UpstreamConfig::new(format!("http://{}", addr), "sso").with_retry(fast_retry());
    let client = UpstreamClient::new(config).unwrap();

    let error = client.fetch_player_stats("psn", "alice", "wz").await.unwrap_err();
    assert_eq!(error, StatsError::ApiUnavailable);
}

#[tokio::test]
async fn test_deadline_bounds_slow_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(profile_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = UpstreamConfig::new(server.uri(), "sso")
        .with_retry(fast_retry())
        .with_total_timeout(Duration::from_millis(200));
    let client = UpstreamClient::new(config).unwrap();

    let started = std::time::Instant::now();
    let error = client.fetch_player_stats("psn", "alice", "wz").await.unwrap_err();
    assert_eq!(error, StatsError::ApiUnavailable);
    assert!(started.elapsed() < Duration::from_secs(4));
}
