//! Two-stage discovery client

use crate::identifier::Identifier;
use crate::selection::{select_by_priority, select_service_uri};
use crate::template::interpolate_template;
use crate::transport::{HttpTransport, ReqwestTransport};
use std::fmt;
use tracing::{debug, warn};
use webfinger_lookup_common::{ClientConfig, Descriptor, DiscoveryError, Link, Result};
use webfinger_lookup_parser::DocumentParser;

/// Characters that would change the host-meta URL's authority or path
const URL_DELIMITERS: &[char] = &[':', '/', '?', '#', '[', ']', '@', '%', '\\'];

/// Steps of a lookup, in order
///
/// Any step can end the lookup with an error instead; nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupState {
    Start,
    IdentifierParsed,
    DomainFetched,
    DomainParsed,
    ServiceLinkSelected,
    TemplateResolved,
    ServiceFetched,
    Done,
}

impl fmt::Display for LookupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LookupState::Start => "start",
            LookupState::IdentifierParsed => "identifier-parsed",
            LookupState::DomainFetched => "domain-fetched",
            LookupState::DomainParsed => "domain-parsed",
            LookupState::ServiceLinkSelected => "service-link-selected",
            LookupState::TemplateResolved => "template-resolved",
            LookupState::ServiceFetched => "service-fetched",
            LookupState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Resolves identifiers to service descriptors via host-meta discovery
///
/// Holds no per-lookup state, so a single client can serve concurrent
/// lookups whenever its transport can.
pub struct DiscoveryClient<T: HttpTransport> {
    transport: T,
    parser: DocumentParser,
    config: ClientConfig,
}

impl DiscoveryClient<ReqwestTransport> {
    /// Client backed by the default `reqwest` transport
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_config(transport, DocumentParser::new(), config))
    }
}

impl<T: HttpTransport> DiscoveryClient<T> {
    /// Create a client with the default configuration
    pub fn new(transport: T, parser: DocumentParser) -> Self {
        Self::with_config(transport, parser, ClientConfig::default())
    }

    pub fn with_config(transport: T, parser: DocumentParser, config: ClientConfig) -> Self {
        Self {
            transport,
            parser,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Look up the service descriptor for an email-like identifier
    ///
    /// Fetches the domain's host-meta document, follows its discovery
    /// link, and returns the parsed service document.
    ///
    /// # Example
    /// ```rust,ignore
    /// let client = DiscoveryClient::from_config(ClientConfig::default())?;
    /// let descriptor = client.lookup("bradfitz@gmail.com")?;
    /// ```
    pub fn lookup(&self, identifier: &str) -> Result<Descriptor> {
        let service_url = self.discover_service_url(identifier)?;

        let body = self.fetch(&service_url)?;
        self.transition(LookupState::ServiceFetched, &service_url);

        let service_doc = self.parse(&body, &service_url)?;
        self.transition(LookupState::Done, &service_url);
        Ok(service_doc)
    }

    /// Run the first stage only and return the service URL to fetch
    pub fn discover_service_url(&self, identifier: &str) -> Result<String> {
        self.transition(LookupState::Start, identifier);
        let identifier = Identifier::parse(identifier)?;
        self.transition(LookupState::IdentifierParsed, identifier.addr_spec());

        if identifier.domain().contains(URL_DELIMITERS) {
            return Err(DiscoveryError::Parse(format!(
                "bad identifier: domain {:?} contains URL delimiters",
                identifier.domain()
            )));
        }
        let host_meta_url = self.config.host_meta_url(identifier.domain());
        let body = self.fetch(&host_meta_url)?;
        self.transition(LookupState::DomainFetched, &host_meta_url);

        let domain_doc = self.parse(&body, &host_meta_url)?;
        self.transition(LookupState::DomainParsed, &host_meta_url);

        let link = self.select_service_link(&domain_doc, &host_meta_url)?;
        self.transition(LookupState::ServiceLinkSelected, &host_meta_url);

        let template = select_service_uri(link).ok_or_else(|| {
            DiscoveryError::Protocol(format!(
                "no usable template/URI in the {} link at {}",
                self.config.discovery_rel, host_meta_url
            ))
        })?;

        let service_url = interpolate_template(&template.value, identifier.addr_spec());
        self.transition(LookupState::TemplateResolved, &service_url);
        Ok(service_url)
    }

    fn select_service_link<'d>(&self, domain_doc: &'d Descriptor, url: &str) -> Result<&'d Link> {
        let rel = self.config.discovery_rel.as_str();
        select_by_priority(domain_doc.links_with_relation(rel)).ok_or_else(|| {
            DiscoveryError::Protocol(format!("no discovery-service link ({}) at {}", rel, url))
        })
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.transport.fetch(url)?;
        if !response.is_success() {
            warn!(url, status = response.status, "Discovery fetch failed");
            return Err(DiscoveryError::Fetch {
                url: url.to_string(),
                status: response.status,
            });
        }
        Ok(response.body)
    }

    fn parse(&self, body: &[u8], url: &str) -> Result<Descriptor> {
        self.parser.parse(body).map_err(|e| match e {
            DiscoveryError::Parse(msg) => DiscoveryError::Parse(format!("{} (from {})", msg, url)),
            other => other,
        })
    }

    fn transition(&self, state: LookupState, subject: &str) {
        debug!(state = %state, subject, "Lookup transition");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpResponse, MockHttpTransport};
    use webfinger_lookup_common::ErrorKind;

    const HOST_META_URL: &str = "http://x.com/.well-known/host-meta";

    fn xrd(body: &str) -> String {
        format!(
            r#"<XRD xmlns="http://docs.oasis-open.org/ns/xri/xrd-1.0">{}</XRD>"#,
            body
        )
    }

    fn service_xrd() -> String {
        xrd("<Subject>acct:alice@x.com</Subject><Alias>http://x.com/alice</Alias>")
    }

    fn expect_host_meta(transport: &mut MockHttpTransport, status: u16, body: String) {
        transport
            .expect_fetch()
            .withf(|url| url == HOST_META_URL)
            .times(1)
            .returning(move |_| Ok(HttpResponse::new(status, body.clone())));
    }

    fn expect_service(transport: &mut MockHttpTransport, expected_url: &'static str) {
        let body = service_xrd();
        transport
            .expect_fetch()
            .withf(move |url| url == expected_url)
            .times(1)
            .returning(move |_| Ok(HttpResponse::new(200, body.clone())));
    }

    fn client(transport: MockHttpTransport) -> DiscoveryClient<MockHttpTransport> {
        DiscoveryClient::new(transport, DocumentParser::new())
    }

    #[test]
    fn test_malformed_identifier_fetches_nothing() {
        let transport = MockHttpTransport::new();
        let err = client(transport).lookup("not-an-email").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("bad identifier"));
    }

    #[test]
    fn test_host_meta_404_stops_lookup() {
        let mut transport = MockHttpTransport::new();
        expect_host_meta(&mut transport, 404, "Not Found".to_string());

        let err = client(transport).lookup("alice@x.com").unwrap_err();
        assert_eq!(
            err,
            DiscoveryError::Fetch {
                url: HOST_META_URL.to_string(),
                status: 404
            }
        );
    }

    #[test]
    fn test_missing_discovery_link_is_protocol_error() {
        let mut transport = MockHttpTransport::new();
        expect_host_meta(
            &mut transport,
            200,
            xrd("<Link><Rel>http://webfinger.info/rel/profile-page</Rel><URI>http://x.com/</URI></Link>"),
        );

        let err = client(transport).lookup("alice@x.com").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(err.to_string().contains("no discovery-service link"));
    }

    #[test]
    fn test_link_without_uris_is_protocol_error() {
        let mut transport = MockHttpTransport::new();
        expect_host_meta(
            &mut transport,
            200,
            xrd("<Link><Rel>describedby</Rel><MediaType>application/xrd+xml</MediaType></Link>"),
        );

        let err = client(transport).lookup("alice@x.com").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(err.to_string().contains("no usable template/URI"));
    }

    #[test]
    fn test_unparseable_host_meta() {
        let mut transport = MockHttpTransport::new();
        expect_host_meta(&mut transport, 200, "<html></html>".to_string());

        let err = client(transport).lookup("alice@x.com").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains(HOST_META_URL));
    }

    #[test]
    fn test_raw_template_lookup() {
        let mut transport = MockHttpTransport::new();
        expect_host_meta(
            &mut transport,
            200,
            xrd("<Link><Rel>describedby</Rel><URITemplate>https://example.com/wf/{uri}</URITemplate></Link>"),
        );
        expect_service(&mut transport, "https://example.com/wf/alice@x.com");

        let descriptor = client(transport).lookup("alice@x.com").unwrap();
        assert_eq!(descriptor.subject.as_deref(), Some("acct:alice@x.com"));
        assert_eq!(descriptor.aliases, vec!["http://x.com/alice"]);
    }

    #[test]
    fn test_escaped_template_lookup() {
        let mut transport = MockHttpTransport::new();
        expect_host_meta(
            &mut transport,
            200,
            xrd("<Link><Rel>describedby</Rel><URITemplate>https://example.com/wf/{%uri}</URITemplate></Link>"),
        );
        expect_service(&mut transport, "https://example.com/wf/alice%40x.com");

        assert!(client(transport).lookup("Alice <alice@x.com>").is_ok());
    }

    #[test]
    fn test_link_selected_by_priority() {
        let mut transport = MockHttpTransport::new();
        expect_host_meta(
            &mut transport,
            200,
            xrd(r#"<Link><Rel>describedby</Rel><URI>http://unranked/</URI></Link>
                   <Link priority="20"><Rel>describedby</Rel><URI>http://twenty/</URI></Link>
                   <Link priority="5"><Rel>describedby</Rel><URI>http://five/</URI></Link>
                   <Link priority="5"><Rel>describedby</Rel><URI>http://five-later/</URI></Link>"#),
        );
        expect_service(&mut transport, "http://five/");

        assert!(client(transport).lookup("alice@x.com").is_ok());
    }

    #[test]
    fn test_uri_fallback_selected_by_priority() {
        let mut transport = MockHttpTransport::new();
        expect_host_meta(
            &mut transport,
            200,
            xrd(r#"<Link><Rel>describedby</Rel>
                     <URI priority="10">http://ten/</URI>
                     <URI priority="0">http://zero/</URI>
                   </Link>"#),
        );
        expect_service(&mut transport, "http://zero/");

        assert!(client(transport).lookup("alice@x.com").is_ok());
    }

    #[test]
    fn test_attribute_encoded_link_with_configured_rel() {
        let mut transport = MockHttpTransport::new();
        expect_host_meta(
            &mut transport,
            200,
            xrd(r#"<Link rel="describedby" href="http://wrong-rel/"/>
                   <Link rel="lrdd" template="http://x.com/describe?uri={%uri}"/>"#),
        );
        expect_service(&mut transport, "http://x.com/describe?uri=alice%40x.com");

        let config = ClientConfig {
            discovery_rel: "lrdd".to_string(),
            ..ClientConfig::default()
        };
        let client = DiscoveryClient::with_config(transport, DocumentParser::new(), config);
        assert!(client.lookup("alice@x.com").is_ok());
    }

    #[test]
    fn test_service_fetch_failure() {
        let mut transport = MockHttpTransport::new();
        expect_host_meta(
            &mut transport,
            200,
            xrd("<Link><Rel>describedby</Rel><URITemplate>http://x.com/wf/{uri}</URITemplate></Link>"),
        );
        transport
            .expect_fetch()
            .withf(|url| url == "http://x.com/wf/alice@x.com")
            .times(1)
            .returning(|_| Ok(HttpResponse::new(500, "oops")));

        let err = client(transport).lookup("alice@x.com").unwrap_err();
        assert_eq!(
            err,
            DiscoveryError::Fetch {
                url: "http://x.com/wf/alice@x.com".to_string(),
                status: 500
            }
        );
        assert!(err.is_retriable());
    }

    #[test]
    fn test_transport_error_propagates() {
        let mut transport = MockHttpTransport::new();
        transport.expect_fetch().times(1).returning(|url| {
            Err(DiscoveryError::Transport {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            })
        });

        let err = client(transport).lookup("alice@x.com").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
    }

    #[test]
    fn test_discover_service_url_only_fetches_host_meta() {
        let mut transport = MockHttpTransport::new();
        expect_host_meta(
            &mut transport,
            200,
            xrd("<Link><Rel>describedby</Rel><URITemplate>http://x.com/wf/{uri}</URITemplate></Link>"),
        );

        let url = client(transport).discover_service_url("alice@x.com").unwrap();
        assert_eq!(url, "http://x.com/wf/alice@x.com");
    }

    #[test]
    fn test_domain_with_url_delimiters_fetches_nothing() {
        for identifier in [
            "alice@x.com#",
            "alice@x.com?",
            "alice@x.com/evil",
            "alice@x.com%2f",
        ] {
            let err = client(MockHttpTransport::new())
                .discover_service_url(identifier)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Parse, "identifier {}", identifier);
            assert!(err.to_string().contains("bad identifier"));
        }
    }

    #[test]
    fn test_config_accessor_returns_configured_rel() {
        let config = ClientConfig {
            discovery_rel: "lrdd".to_string(),
            ..ClientConfig::default()
        };
        let client =
            DiscoveryClient::with_config(MockHttpTransport::new(), DocumentParser::new(), config);
        assert_eq!(client.config().discovery_rel, "lrdd");
    }

    #[test]
    fn test_client_and_descriptor_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DiscoveryClient<ReqwestTransport>>();
        assert_send_sync::<DiscoveryClient<MockHttpTransport>>();
        assert_send_sync::<Descriptor>();
    }

    #[test]
    fn test_lookup_state_names() {
        assert_eq!(LookupState::ServiceLinkSelected.to_string(), "service-link-selected");
        assert_eq!(LookupState::Done.to_string(), "done");
    }
}
