/// DLNA/UPnP casting
///
/// This crate provides:
/// - SOAP envelope construction and fault parsing (quick-xml)
/// - AVTransport control: SetAVTransportURI followed by Play
pub mod avtransport;
pub mod soap;

pub use avtransport::DlnaRendererClient;
pub use soap::{build_envelope, is_benign_fault, parse_fault, SoapEnvelope, SoapFault};
