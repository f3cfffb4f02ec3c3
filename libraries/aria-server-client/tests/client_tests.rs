//! Tests for the Aria server client.
//!
//! These tests use mock servers to verify client behavior without
//! requiring a real server connection.

use aria_core::{AriaError, PlaybackSource, Track, TrackCatalog, TrackId};
use aria_server_client::{AriaServerClient, ServerClientError, ServerConfig};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Client Creation Tests
// =============================================================================

mod client_creation {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(AriaServerClient::new(ServerConfig::new("https://example.com")).is_ok());
        assert!(AriaServerClient::new(ServerConfig::new("http://localhost:8080")).is_ok());
    }

    #[test]
    fn test_empty_url_rejected() {
        match AriaServerClient::new(ServerConfig::new("")) {
            Err(ServerClientError::InvalidUrl(msg)) => assert!(msg.contains("empty")),
            _ => panic!("Expected InvalidUrl error"),
        }
    }

    #[test]
    fn test_url_without_scheme_rejected() {
        assert!(matches!(
            AriaServerClient::new(ServerConfig::new("example.com")),
            Err(ServerClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            AriaServerClient::new(ServerConfig::new("ftp://example.com")),
            Err(ServerClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_url_normalization_trailing_slashes() {
        let client = AriaServerClient::new(ServerConfig::new("https://example.com///")).unwrap();
        assert_eq!(client.url().await, "https://example.com");
    }

    #[tokio::test]
    async fn test_user_switch() {
        let client = AriaServerClient::new(ServerConfig::new("https://example.com")).unwrap();
        assert!(!client.is_authenticated().await);

        client
            .set_user(Some("7".to_string()), Some("token".to_string()))
            .await;

        assert!(client.is_authenticated().await);
        assert_eq!(client.user_id().await.as_deref(), Some("7"));
    }
}

// =============================================================================
// Track Tests
// =============================================================================

mod tracks {
    use super::*;

    #[tokio::test]
    async fn test_get_tracks_resolves_relative_urls() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tracks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 1,
                    "title": "Local",
                    "artist": "Someone",
                    "duration": 201.5,
                    "audioUrl": "/uploads/local.mp3",
                    "coverImage": "covers/local.jpg"
                },
                {
                    "id": "yt-abc",
                    "title": "Remote",
                    "url": "https://cdn.example.com/remote.mp3",
                    "isExternal": true
                }
            ])))
            .mount(&server)
            .await;

        let client = AriaServerClient::new(ServerConfig::new(server.uri())).unwrap();
        let tracks = client.get_tracks().await.unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].id, TrackId::from(1_i64));
        assert_eq!(tracks[0].audio_url, format!("{}/uploads/local.mp3", server.uri()));
        assert_eq!(
            tracks[0].artwork_url.as_deref(),
            Some(format!("{}/covers/local.jpg", server.uri()).as_str())
        );
        assert_eq!(tracks[1].id, TrackId::from("yt-abc"));
        assert_eq!(tracks[1].audio_url, "https://cdn.example.com/remote.mp3");
        assert!(tracks[1].external);
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tracks"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tracks": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            AriaServerClient::new(ServerConfig::new(server.uri()).with_token("secret")).unwrap();

        assert!(client.get_tracks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_required() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tracks"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = AriaServerClient::new(ServerConfig::new(server.uri())).unwrap();

        assert!(matches!(
            client.get_tracks().await,
            Err(ServerClientError::AuthRequired)
        ));
    }

    #[tokio::test]
    async fn test_server_error_keeps_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tracks"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
            .mount(&server)
            .await;

        let client = AriaServerClient::new(ServerConfig::new(server.uri())).unwrap();

        match client.get_tracks().await {
            Err(ServerClientError::ServerError { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "database down");
            }
            other => panic!("Expected ServerError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tracks"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = AriaServerClient::new(ServerConfig::new(server.uri())).unwrap();

        assert!(matches!(
            client.get_tracks().await,
            Err(ServerClientError::ParseError(_))
        ));
    }
}

// =============================================================================
// Liked Songs Tests
// =============================================================================

mod liked_songs {
    use super::*;

    #[tokio::test]
    async fn test_nested_route() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users/42/liked-songs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 3, "title": "Liked", "audioUrl": "/uploads/liked.mp3" }
            ])))
            .mount(&server)
            .await;

        let client =
            AriaServerClient::new(ServerConfig::new(server.uri()).with_user("42")).unwrap();
        let liked = client.get_liked_songs().await.unwrap();

        assert_eq!(liked.len(), 1);
        assert_eq!(liked[0].title, "Liked");
    }

    #[tokio::test]
    async fn test_falls_back_to_query_route() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users/42/liked-songs"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/liked-songs"))
            .and(query_param("userId", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 9, "title": "Fallback", "audioUrl": "/uploads/fallback.mp3" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            AriaServerClient::new(ServerConfig::new(server.uri()).with_user("42")).unwrap();
        let liked = client.get_liked_songs().await.unwrap();

        assert_eq!(liked[0].id, TrackId::from(9_i64));
    }

    #[tokio::test]
    async fn test_no_user_means_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = AriaServerClient::new(ServerConfig::new(server.uri())).unwrap();

        assert!(client.get_liked_songs().await.unwrap().is_empty());
    }
}

// =============================================================================
// Like Tests
// =============================================================================

mod likes {
    use super::*;

    #[tokio::test]
    async fn test_toggle_like_of_stored_track() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/tracks/5/like"))
            .and(body_json(json!({ "userId": "42" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "liked": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            AriaServerClient::new(ServerConfig::new(server.uri()).with_user("42")).unwrap();
        let track = Track::new(5_i64, "Five", "/uploads/five.mp3");

        assert!(client.toggle_like(&track).await.unwrap());
    }

    #[tokio::test]
    async fn test_toggle_like_of_external_track_sends_track() {
        let server = MockServer::start().await;
        let track = Track::new("yt-abc", "Remote", "https://cdn.example.com/remote.mp3")
            .with_artist("Elsewhere")
            .external();

        Mock::given(method("POST"))
            .and(path("/api/external-tracks/yt-abc/like"))
            .and(body_json(serde_json::to_value(&track).unwrap()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "liked": false })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AriaServerClient::new(ServerConfig::new(server.uri())).unwrap();

        assert!(!client.toggle_like(&track).await.unwrap());
    }
}

// =============================================================================
// Catalog Tests
// =============================================================================

mod catalog {
    use super::*;

    #[tokio::test]
    async fn test_fetch_tracks_by_source() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tracks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "title": "One", "audioUrl": "/a.mp3" },
                { "id": 2, "title": "Two", "audioUrl": "/b.mp3" }
            ])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/users/1/liked-songs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 2, "title": "Two", "audioUrl": "/b.mp3" }
            ])))
            .mount(&server)
            .await;

        let client =
            AriaServerClient::new(ServerConfig::new(server.uri()).with_user("1")).unwrap();
        let catalog: &dyn TrackCatalog = &client;

        assert_eq!(catalog.fetch_tracks(PlaybackSource::All).await.unwrap().len(), 2);
        assert_eq!(catalog.fetch_tracks(PlaybackSource::Liked).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_refused_connection_is_server_unreachable() {
        let client = AriaServerClient::new(ServerConfig::new("http://127.0.0.1:1")).unwrap();

        assert!(matches!(
            client.get_tracks().await,
            Err(ServerClientError::ServerUnreachable(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Port 1 is never served in test environments
        let client = AriaServerClient::new(ServerConfig::new("http://127.0.0.1:1")).unwrap();
        let catalog: &dyn TrackCatalog = &client;

        assert!(matches!(
            catalog.fetch_tracks(PlaybackSource::All).await,
            Err(AriaError::Network(_))
        ));
    }
}
