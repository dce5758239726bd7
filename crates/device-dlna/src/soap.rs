/// SOAP 1.1 envelopes for UPnP control actions, and fault parsing with quick-xml
use debridcast_core::{escape_xml, CastError};
use quick_xml::events::Event;
use quick_xml::Reader;

/// One UPnP action call: service, action name and ordered arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapEnvelope {
    pub service_urn: String,
    pub action: String,
    pub args: Vec<(String, String)>,
}

impl SoapEnvelope {
    pub fn new(service_urn: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            service_urn: service_urn.into(),
            action: action.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument; order is preserved on the wire
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push((name.into(), value.into()));
        self
    }

    /// Value for the `SOAPAction` header, quotes included
    pub fn soap_action_header(&self) -> String {
        format!("\"{}#{}\"", self.service_urn, self.action)
    }

    pub fn to_xml(&self) -> String {
        let args_xml: String = self
            .args
            .iter()
            .map(|(name, value)| format!("<{name}>{}</{name}>", escape_xml(value)))
            .collect();

        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
  <s:Body>
    <u:{action} xmlns:u="{urn}">{args_xml}</u:{action}>
  </s:Body>
</s:Envelope>"#,
            action = self.action,
            urn = escape_xml(&self.service_urn),
        )
    }
}

/// Build a SOAP envelope for `action` on `service_urn`
pub fn build_envelope(service_urn: &str, action: &str, args: &[(&str, &str)]) -> String {
    args.iter()
        .fold(SoapEnvelope::new(service_urn, action), |env, (k, v)| env.arg(*k, *v))
        .to_xml()
}

/// Contents of a `<s:Fault>` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoapFault {
    pub fault_code: String,
    pub fault_string: String,
    /// From `<detail><UPnPError><errorCode>`
    pub error_code: Option<u32>,
    pub error_description: Option<String>,
}

impl SoapFault {
    pub fn description(&self) -> String {
        self.error_description
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| self.fault_string.clone())
    }

    pub fn into_error(self) -> Option<CastError> {
        let code = self.error_code?;
        Some(CastError::fault(code as i64, self.description()))
    }
}

/// Parse a SOAP response body.
///
/// `Ok(None)` for well-formed XML that carries no fault.
pub fn parse_fault(body: &str) -> Result<Option<SoapFault>, CastError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut fault: Option<SoapFault> = None;
    let mut current_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"Fault" {
                    fault = Some(SoapFault::default());
                }
                current_text.clear();
            }
            Ok(Event::End(e)) => {
                if let Some(f) = fault.as_mut() {
                    let text = current_text.trim().to_string();
                    match e.local_name().as_ref() {
                        b"faultcode" => f.fault_code = text,
                        b"faultstring" => f.fault_string = text,
                        b"errorCode" => f.error_code = text.parse().ok(),
                        b"errorDescription" => f.error_description = Some(text),
                        _ => {}
                    }
                }
                current_text.clear();
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| CastError::MalformedResponse(e.to_string()))?;
                current_text.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(CastError::MalformedResponse(format!(
                    "XML parsing error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(fault)
}

/// True only for UPnP error 701 ("Transition not available")
pub fn is_benign_fault(body: &str) -> bool {
    matches!(
        parse_fault(body).map(|f| f.and_then(SoapFault::into_error)),
        Ok(Some(e)) if e.is_benign_play_fault()
    )
}

#[cfg(test)]
pub(crate) fn fault_body(code: u32, description: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
  <s:Body>
    <s:Fault>
      <faultcode>s:Client</faultcode>
      <faultstring>UPnPError</faultstring>
      <detail>
        <UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
          <errorCode>{code}</errorCode>
          <errorDescription>{description}</errorDescription>
        </UPnPError>
      </detail>
    </s:Fault>
  </s:Body>
</s:Envelope>"#
    )
}
