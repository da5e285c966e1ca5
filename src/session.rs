use super::*;
use crate::locator::DEFAULT_CLIP_LENGTH;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// One captured click. Field names serialize in the camelCase form the
/// exported JSON uses (`tagName`, `cssSelector`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickRecord {
    pub tag_name: String,
    pub id: String,
    pub class_name: String,
    pub name: String,
    pub text_content: String,
    pub xpath: String,
    pub css_selector: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Requests understood by a [`Recorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    StartRecording,
    StopRecording,
    GetState,
    GetRecords,
    ClearRecords,
    ClickCapture(ClickRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Ack,
    State { recording: bool },
    Records(Vec<ClickRecord>),
    Total(usize),
    Ignored,
}

/// Owns the recording state and the ordered click log. Created stopped;
/// captures sent while stopped are answered [`Response::Ignored`].
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    recording: bool,
    records: Vec<ClickRecord>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn records(&self) -> &[ClickRecord] {
        &self.records
    }

    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::StartRecording => {
                self.recording = true;
                Response::Ack
            }
            Request::StopRecording => {
                self.recording = false;
                Response::Ack
            }
            Request::GetState => Response::State {
                recording: self.recording,
            },
            Request::GetRecords => Response::Records(self.records.clone()),
            Request::ClearRecords => {
                self.records.clear();
                Response::Total(0)
            }
            Request::ClickCapture(record) => {
                if self.recording {
                    self.records.push(record);
                    Response::Total(self.records.len())
                } else {
                    Response::Ignored
                }
            }
        }
    }

    /// Resolves the click target, assembles a record and logs it. Returns
    /// the record when it was accepted, `None` for unresolvable targets or
    /// while stopped.
    pub fn capture_click(&mut self, doc: &Document, target: NodeId) -> Option<ClickRecord> {
        let record = build_click_record(doc, target, unix_timestamp_ms())?;
        match self.handle(Request::ClickCapture(record.clone())) {
            Response::Total(_) => Some(record),
            _ => None,
        }
    }

    /// The record list as pretty-printed JSON, the body of an exported file.
    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.records).map_err(|err| Error::Export(err.to_string()))
    }
}

/// Deepest-element resolution for a click target: elements resolve to
/// themselves, text nodes to their parent element.
pub fn resolve_click_target(doc: &Document, node_id: NodeId) -> Option<NodeId> {
    match doc.nodes.get(node_id.0).map(|node| &node.node_type) {
        Some(NodeType::Element(_)) => Some(node_id),
        Some(NodeType::Text(_)) => doc.parent_element(node_id),
        _ => None,
    }
}

pub fn build_click_record(doc: &Document, target: NodeId, timestamp: u64) -> Option<ClickRecord> {
    let target = resolve_click_target(doc, target)?;
    let attr_or_empty = |name: &str| doc.attr(target, name).unwrap_or("").to_string();

    Some(ClickRecord {
        // DOM APIs report element tag names uppercased, and the exported
        // records keep that casing.
        tag_name: doc.tag_name(target).unwrap_or("").to_ascii_uppercase(),
        id: attr_or_empty("id"),
        class_name: attr_or_empty("class"),
        name: attr_or_empty("name"),
        text_content: clip_text(&doc.text_content(target), DEFAULT_CLIP_LENGTH),
        xpath: doc.element_xpath(target),
        css_selector: doc.element_css_selector(target),
        timestamp,
    })
}

fn unix_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
