/// AVTransport SOAP control for UPnP MediaRenderers
///
/// A cast is two strictly ordered actions against the renderer's control URL:
/// - SetAVTransportURI (hard failure if refused)
/// - Play (UPnP 701 tolerated, see `play_outcome`)
use crate::soap::{parse_fault, SoapEnvelope};
use async_trait::async_trait;
use debridcast_core::{
    CastConfig, CastError, CastOutcome, Caster, DidlMetadata, Device, MediaReference,
};
use reqwest::Client;
use tracing::{debug, info, warn};

/// DLNA renderer client
pub struct DlnaRendererClient {
    client: Client,
    config: CastConfig,
}

impl DlnaRendererClient {
    pub fn new(config: CastConfig) -> Result<Self, CastError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self { client, config })
    }

    /// Tell the renderer which URL to load
    pub async fn set_av_transport_uri(
        &self,
        control_url: &str,
        uri: &str,
        metadata: &str,
    ) -> Result<(), CastError> {
        info!("Setting AVTransport URI: {}", uri);

        let envelope = SoapEnvelope::new(&self.config.avtransport_service, "SetAVTransportURI")
            .arg("InstanceID", "0")
            .arg("CurrentURI", uri)
            .arg("CurrentURIMetaData", metadata);

        self.send_soap_action(control_url, &envelope).await?;

        info!("AVTransport URI set successfully");
        Ok(())
    }

    /// Start playback of the current URI
    pub async fn play(&self, control_url: &str) -> Result<(), CastError> {
        info!("Starting playback");

        let envelope = SoapEnvelope::new(&self.config.avtransport_service, "Play")
            .arg("InstanceID", "0")
            .arg("Speed", "1");

        self.send_soap_action(control_url, &envelope).await?;

        info!("Playback started");
        Ok(())
    }

    /// POST an action; a non-2xx answer becomes `Fault` when it carries a UPnP error code
    async fn send_soap_action(
        &self,
        control_url: &str,
        envelope: &SoapEnvelope,
    ) -> Result<String, CastError> {
        let soap_action = envelope.soap_action_header();
        let body = envelope.to_xml();

        debug!("Sending SOAP action: {}", soap_action);
        debug!("To URL: {}", control_url);
        debug!("Body: {}", body);

        let response = self
            .client
            .post(control_url)
            .header("Content-Type", r#"text/xml; charset="utf-8""#)
            .header("SOAPAction", soap_action)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            debug!("SOAP error response ({}): {}", status, response_text);
            let fault = parse_fault(&response_text).ok().flatten();
            return Err(fault
                .and_then(|f| f.into_error())
                .unwrap_or(CastError::HttpStatus {
                    status: status.as_u16(),
                    body: response_text,
                }));
        }

        debug!("SOAP response: {}", response_text);
        Ok(response_text)
    }

    async fn try_cast(
        &self,
        device: &Device,
        media: &MediaReference,
    ) -> Result<CastOutcome, CastError> {
        device.validate()?;
        media.validate()?;

        let control_url = self.config.dlna_control_url(&device.address);
        let metadata = DidlMetadata::from_media(media);
        debug!(
            "Casting '{}' ({}) to {}",
            metadata.title, metadata.mime_type, device.name
        );

        info!("Setting URI on {}...", device.address);
        self.set_av_transport_uri(&control_url, &media.url, &metadata.to_xml())
            .await?;

        info!("Sending Play command to {}...", device.address);
        play_outcome(self.play(&control_url).await)
    }
}

/// Classify the result of the Play step.
///
/// The URI is already set at this point, so only a real UPnP refusal other
/// than 701 fails the cast. Without a fault to inspect, playback is reported
/// as unconfirmed.
fn play_outcome(result: Result<(), CastError>) -> Result<CastOutcome, CastError> {
    match result {
        Ok(()) => Ok(CastOutcome::playing()),
        Err(e) if e.is_benign_play_fault() => {
            warn!("Play returned a transition fault, treating as success: {}", e);
            Ok(CastOutcome::playing())
        }
        Err(e) if e.is_fault() => Err(e),
        Err(e) => {
            warn!("Play warning: {}", e);
            Ok(CastOutcome::degraded(format!("playback not confirmed: {}", e)))
        }
    }
}

#[async_trait]
impl Caster for DlnaRendererClient {
    fn name(&self) -> &'static str {
        "dlna"
    }

    async fn cast(&self, device: &Device, media: &MediaReference) -> CastOutcome {
        let outcome = CastOutcome::from(self.try_cast(device, media).await);
        if let CastOutcome::Failure { reason } = &outcome {
            warn!("DLNA cast to {} failed: {}", device.name, reason);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soap::fault_body;
    use debridcast_core::DeviceProtocol;
    use wiremock::matchers::{header, method, path};
    use std::net::TcpListener;
    use std::time::{Duration, Instant};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    const CONTROL_PATH: &str = "/upnp/control/AVTransport1";

    fn client_on_port(port: u16, request_timeout_secs: u64) -> DlnaRendererClient {
        DlnaRendererClient::new(CastConfig {
            dlna_port: port,
            request_timeout_secs,
            ..CastConfig::default()
        })
        .unwrap()
    }

    fn client_for(server: &MockServer) -> DlnaRendererClient {
        client_on_port(server.address().port(), 2)
    }

    /// A local port with nothing listening on it
    fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    fn local_renderer() -> Device {
        Device::new("tv", "Living Room TV", "127.0.0.1", DeviceProtocol::Dlna)
    }

    fn release() -> MediaReference {
        MediaReference::new(
            "http://x/My.Show.S01E02.1080p.BluRay.x264-GROUP.mkv",
            "My.Show.S01E02.1080p.BluRay.x264-GROUP.mkv",
        )
    }

    fn soap_action_of(request: &Request) -> String {
        request
            .headers
            .get("SOAPAction")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    async fn mount_action(server: &MockServer, action: &str, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(CONTROL_PATH))
            .and(header(
                "SOAPAction",
                format!("\"urn:schemas-upnp-org:service:AVTransport:1#{action}\"").as_str(),
            ))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[test]
    fn test_play_outcome_classification() {
        assert_eq!(play_outcome(Ok(())).unwrap(), CastOutcome::playing());
        assert_eq!(
            play_outcome(Err(CastError::fault(701, "Transition not available"))).unwrap(),
            CastOutcome::playing()
        );
        assert!(play_outcome(Err(CastError::fault(704, "Playing failed"))).is_err());

        let degraded = play_outcome(Err(CastError::Transport("timed out".into()))).unwrap();
        assert!(matches!(
            degraded,
            CastOutcome::Success { queued: false, warning: Some(_) }
        ));
    }

    #[tokio::test]
    async fn test_set_uri_then_play() {
        let server = MockServer::start().await;
        mount_action(&server, "SetAVTransportURI", ResponseTemplate::new(200)).await;
        mount_action(&server, "Play", ResponseTemplate::new(200)).await;

        let outcome = client_for(&server).cast(&local_renderer(), &release()).await;
        assert_eq!(outcome, CastOutcome::playing());

        let requests = server.received_requests().await.unwrap();
        let actions: Vec<String> = requests.iter().map(soap_action_of).collect();
        assert_eq!(
            actions,
            vec![
                "\"urn:schemas-upnp-org:service:AVTransport:1#SetAVTransportURI\"".to_string(),
                "\"urn:schemas-upnp-org:service:AVTransport:1#Play\"".to_string(),
            ]
        );

        let set_uri = String::from_utf8_lossy(&requests[0].body).to_string();
        assert_eq!(
            requests[0].headers.get("Content-Type").unwrap(),
            r#"text/xml; charset="utf-8""#
        );
        assert!(set_uri.contains("<InstanceID>0</InstanceID>"));
        assert!(set_uri.contains(
            "<CurrentURI>http://x/My.Show.S01E02.1080p.BluRay.x264-GROUP.mkv</CurrentURI>"
        ));
        assert!(set_uri.contains("&lt;dc:title&gt;My Show S01E02&lt;/dc:title&gt;"));
        assert!(set_uri.contains("video/x-matroska"));

        let play = String::from_utf8_lossy(&requests[1].body).to_string();
        assert!(play.contains("<InstanceID>0</InstanceID><Speed>1</Speed>"));
    }

    #[tokio::test]
    async fn test_set_uri_failure_skips_play() {
        let server = MockServer::start().await;
        mount_action(
            &server,
            "SetAVTransportURI",
            ResponseTemplate::new(500).set_body_string(fault_body(714, "Illegal MIME-type")),
        )
        .await;
        Mock::given(method("POST"))
            .and(header(
                "SOAPAction",
                "\"urn:schemas-upnp-org:service:AVTransport:1#Play\"",
            ))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = client_for(&server).cast(&local_renderer(), &release()).await;
        match outcome {
            CastOutcome::Failure { reason } => assert!(reason.contains("Illegal MIME-type")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_set_uri_http_error_is_failure() {
        let server = MockServer::start().await;
        mount_action(
            &server,
            "SetAVTransportURI",
            ResponseTemplate::new(404).set_body_string("no such service"),
        )
        .await;

        let outcome = client_for(&server).cast(&local_renderer(), &release()).await;
        assert_eq!(
            outcome,
            CastOutcome::Failure {
                reason: "receiver returned HTTP 404: no such service".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_play_transition_fault_is_success() {
        let server = MockServer::start().await;
        mount_action(&server, "SetAVTransportURI", ResponseTemplate::new(200)).await;
        mount_action(
            &server,
            "Play",
            ResponseTemplate::new(500).set_body_string(fault_body(701, "Transition not available")),
        )
        .await;

        let outcome = client_for(&server).cast(&local_renderer(), &release()).await;
        assert_eq!(outcome, CastOutcome::playing());
    }

    #[tokio::test]
    async fn test_play_other_fault_is_failure() {
        let server = MockServer::start().await;
        mount_action(&server, "SetAVTransportURI", ResponseTemplate::new(200)).await;
        mount_action(
            &server,
            "Play",
            ResponseTemplate::new(500).set_body_string(fault_body(704, "Playing failed")),
        )
        .await;

        let outcome = client_for(&server).cast(&local_renderer(), &release()).await;
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn test_play_without_fault_is_degraded() {
        let server = MockServer::start().await;
        mount_action(&server, "SetAVTransportURI", ResponseTemplate::new(200)).await;
        mount_action(&server, "Play", ResponseTemplate::new(503).set_body_string("busy")).await;

        let outcome = client_for(&server).cast(&local_renderer(), &release()).await;
        match outcome {
            CastOutcome::Success { queued, warning } => {
                assert!(!queued);
                assert!(warning.unwrap().contains("503"));
            }
            other => panic!("expected degraded success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_address_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let device = Device::new("tv", "TV", "living-room", DeviceProtocol::Dlna);
        let outcome = client_for(&server).cast(&device, &release()).await;
        assert!(matches!(outcome, CastOutcome::Failure { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_renderer_is_failure() {
        let client = client_on_port(closed_port(), 2);

        let outcome = client.cast(&local_renderer(), &release()).await;
        match outcome {
            CastOutcome::Failure { reason } => assert!(reason.starts_with("transport error")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_renderer_hits_request_timeout() {
        let server = MockServer::start().await;
        mount_action(
            &server,
            "SetAVTransportURI",
            ResponseTemplate::new(200).set_delay(Duration::from_secs(4)),
        )
        .await;

        let started = Instant::now();
        let outcome = client_on_port(server.address().port(), 1)
            .cast(&local_renderer(), &release())
            .await;

        assert!(started.elapsed() < Duration::from_secs(3));
        match outcome {
            CastOutcome::Failure { reason } => assert!(reason.starts_with("transport error")),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
