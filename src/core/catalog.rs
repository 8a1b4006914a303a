//! Artikelstamm catalog reading and patching.
//!
//! The document is streamed once with a namespace-aware reader. Patching does
//! not re-serialize anything: the output is the input with the text of each
//! updated `DEDUCTIBLE` element spliced in, so every other byte survives.

use crate::config::settings::{CatalogSettings, MalformedPolicy};
use crate::domain::model::{GtinFlagMap, ItemChange, PatchReport};
use crate::utils::error::{ReconcileError, Result};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::ops::Range;

const ITEMS: &[u8] = b"ITEMS";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Gtin,
    Deductible,
    Description,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"GTIN" => Some(Field::Gtin),
            b"DEDUCTIBLE" => Some(Field::Deductible),
            b"DSCR" => Some(Field::Description),
            _ => None,
        }
    }
}

/// Location of a DEDUCTIBLE element's content in the source bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    /// `<DEDUCTIBLE>..</DEDUCTIBLE>`: the range between the tags.
    Content(Range<usize>),
    /// `<DEDUCTIBLE/>`: the whole tag, plus the element's qualified name.
    SelfClosing { tag: Range<usize>, qname: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Deductible {
    text: String,
    slot: Slot,
}

/// One `ITEM` as found in the catalog. `index` is 1-based in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogItem {
    pub index: usize,
    pub gtin: Option<String>,
    pub description: Option<String>,
    pub deductible: Option<String>,
}

#[derive(Debug, Default)]
struct ScannedItem {
    index: usize,
    gtin: Option<String>,
    description: Option<String>,
    deductible: Option<Deductible>,
}

impl ScannedItem {
    fn has(&self, field: Field) -> bool {
        match field {
            Field::Gtin => self.gtin.is_some(),
            Field::Deductible => self.deductible.is_some(),
            Field::Description => self.description.is_some(),
        }
    }
}

struct OpenField {
    field: Field,
    text: String,
    content_start: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemsState {
    Pending,
    Open,
    Closed,
}

fn in_namespace(ns: &ResolveResult, namespace: &[u8]) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(bound)) if *bound == namespace)
}

fn malformed(message: impl Into<String>) -> ReconcileError {
    ReconcileError::MalformedCatalog {
        message: message.into(),
    }
}

/// Walks the `ITEM` children of the root's first `ITEMS` element and hands
/// each one to `visit` once its end tag has been read. Only the first
/// `GTIN`, `DEDUCTIBLE` and `DSCR` child of an item is considered.
fn walk_items<F>(xml: &[u8], namespace: &str, mut visit: F) -> Result<()>
where
    F: FnMut(ScannedItem) -> Result<()>,
{
    let namespace = namespace.as_bytes();
    // The reader drops a leading BOM without counting it, so positions are
    // taken relative to the body and shifted back into `xml`.
    let base = if xml.starts_with(UTF8_BOM) { UTF8_BOM.len() } else { 0 };
    let mut reader = NsReader::from_reader(&xml[base..]);

    let mut depth = 0usize;
    let mut items = ItemsState::Pending;
    let mut item: Option<ScannedItem> = None;
    let mut field: Option<OpenField> = None;
    let mut item_count = 0usize;

    loop {
        let (bound, event) = {
            let (ns, event) = reader.read_resolved_event()?;
            (in_namespace(&ns, namespace), event)
        };

        match event {
            Event::Start(e) => {
                depth += 1;
                match depth {
                    2 if items == ItemsState::Pending
                        && bound
                        && e.local_name().as_ref() == ITEMS =>
                    {
                        items = ItemsState::Open;
                    }
                    // Any element child of ITEMS is an item, whatever its name.
                    3 if items == ItemsState::Open => {
                        item_count += 1;
                        item = Some(ScannedItem {
                            index: item_count,
                            ..Default::default()
                        });
                    }
                    4 if bound => {
                        if let (Some(scan), Some(kind)) =
                            (item.as_ref(), Field::from_local_name(e.local_name().as_ref()))
                        {
                            if !scan.has(kind) {
                                field = Some(OpenField {
                                    field: kind,
                                    text: String::new(),
                                    content_start: base + reader.buffer_position(),
                                });
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => match depth + 1 {
                2 if items == ItemsState::Pending && bound && e.local_name().as_ref() == ITEMS => {
                    items = ItemsState::Closed;
                }
                3 if items == ItemsState::Open => {
                    item_count += 1;
                    visit(ScannedItem {
                        index: item_count,
                        ..Default::default()
                    })?;
                }
                4 if bound => {
                    if let (Some(scan), Some(kind)) =
                        (item.as_mut(), Field::from_local_name(e.local_name().as_ref()))
                    {
                        if !scan.has(kind) {
                            match kind {
                                Field::Gtin => scan.gtin = Some(String::new()),
                                Field::Description => scan.description = Some(String::new()),
                                Field::Deductible => {
                                    let end = base + reader.buffer_position();
                                    let start = xml[..end]
                                        .iter()
                                        .rposition(|&b| b == b'<')
                                        .ok_or_else(|| malformed("unterminated DEDUCTIBLE tag"))?;
                                    scan.deductible = Some(Deductible {
                                        text: String::new(),
                                        slot: Slot::SelfClosing {
                                            tag: start..end,
                                            qname: e.name().as_ref().to_vec(),
                                        },
                                    });
                                }
                            }
                        }
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some(open) = field.as_mut().filter(|_| depth == 4) {
                    open.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(open) = field.as_mut().filter(|_| depth == 4) {
                    open.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(_) => {
                match depth {
                    4 => {
                        if let (Some(open), Some(scan)) = (field.take(), item.as_mut()) {
                            let end = base + reader.buffer_position();
                            close_field(xml, open, end, scan)?;
                        }
                    }
                    3 => {
                        if let Some(scan) = item.take() {
                            visit(scan)?;
                        }
                    }
                    2 if items == ItemsState::Open => items = ItemsState::Closed,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(malformed(format!("document ends with {} unclosed elements", depth)));
    }
    if items == ItemsState::Pending {
        return Err(ReconcileError::MissingItems {
            namespace: String::from_utf8_lossy(namespace).into_owned(),
        });
    }
    Ok(())
}

fn close_field(xml: &[u8], open: OpenField, end: usize, scan: &mut ScannedItem) -> Result<()> {
    match open.field {
        Field::Gtin => scan.gtin = Some(open.text),
        Field::Description => scan.description = Some(open.text),
        Field::Deductible => {
            // `end` is just past the end tag's '>'; the end tag starts at the last "</".
            let content_end = xml[open.content_start..end]
                .windows(2)
                .rposition(|w| w == b"</")
                .map(|offset| open.content_start + offset)
                .ok_or_else(|| malformed("DEDUCTIBLE end tag not found"))?;
            scan.deductible = Some(Deductible {
                text: open.text,
                slot: Slot::Content(open.content_start..content_end),
            });
        }
    }
    Ok(())
}

/// Lists every item of the catalog with the fields the patcher looks at.
pub fn read_items(xml: &[u8], namespace: &str) -> Result<Vec<CatalogItem>> {
    let mut items = Vec::new();
    walk_items(xml, namespace, |scan| {
        items.push(CatalogItem {
            index: scan.index,
            gtin: scan.gtin,
            description: scan.description,
            deductible: scan.deductible.map(|d| d.text),
        });
        Ok(())
    })?;
    Ok(items)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedCatalog {
    pub data: Vec<u8>,
    pub report: PatchReport,
}

struct Splice {
    range: Range<usize>,
    bytes: Vec<u8>,
}

impl Splice {
    fn for_slot(xml: &[u8], slot: Slot, value: &str) -> Self {
        match slot {
            Slot::Content(range) => Splice {
                range,
                bytes: value.as_bytes().to_vec(),
            },
            Slot::SelfClosing { tag, qname } => {
                // "<q:DEDUCTIBLE a='b'/>" -> "<q:DEDUCTIBLE a='b'>value</q:DEDUCTIBLE>"
                let mut bytes = xml[tag.start..tag.end - 2].to_vec();
                bytes.push(b'>');
                bytes.extend_from_slice(value.as_bytes());
                bytes.extend_from_slice(b"</");
                bytes.extend_from_slice(&qname);
                bytes.push(b'>');
                Splice { range: tag, bytes }
            }
        }
    }
}

fn apply_splices(xml: &[u8], splices: &[Splice]) -> Vec<u8> {
    let extra: usize = splices.iter().map(|s| s.bytes.len()).sum();
    let mut out = Vec::with_capacity(xml.len() + extra);
    let mut cursor = 0;
    for splice in splices {
        out.extend_from_slice(&xml[cursor..splice.range.start]);
        out.extend_from_slice(&splice.bytes);
        cursor = splice.range.end;
    }
    out.extend_from_slice(&xml[cursor..]);
    out
}

/// Sets DEDUCTIBLE to `percentage` on every item that has a DEDUCTIBLE
/// element and whose GTIN is in `mapping`. Items without DEDUCTIBLE or with
/// an unlisted GTIN are left as they are.
pub fn patch_catalog(
    xml: &[u8],
    mapping: &GtinFlagMap,
    percentage: u32,
    settings: &CatalogSettings,
) -> Result<PatchedCatalog> {
    let new_value = percentage.to_string();
    let mut report = PatchReport::default();
    let mut splices = Vec::new();

    walk_items(xml, &settings.namespace, |scan| {
        report.items_seen += 1;

        let Some(gtin) = scan.gtin else {
            return match settings.on_malformed_item {
                MalformedPolicy::Abort => Err(ReconcileError::MissingField {
                    item: scan.index,
                    field: "GTIN",
                }),
                MalformedPolicy::Skip => {
                    tracing::warn!("Skipping ITEM #{}: no GTIN element", scan.index);
                    report.malformed_skipped += 1;
                    Ok(())
                }
            };
        };

        let Some(deductible) = scan.deductible else {
            report.without_deductible += 1;
            return Ok(());
        };

        if !mapping.contains(&gtin) {
            report.not_listed += 1;
            return Ok(());
        }

        let description = match scan.description {
            Some(description) => description,
            None => {
                tracing::warn!("ITEM #{} ({}) has no DSCR element", scan.index, gtin);
                report.without_description += 1;
                String::new()
            }
        };
        tracing::info!(
            "{} ({}) {} --> {}%",
            gtin,
            description,
            deductible.text,
            new_value
        );

        if deductible.text == new_value {
            report.already_set += 1;
            return Ok(());
        }

        splices.push(Splice::for_slot(xml, deductible.slot, &new_value));
        report.modified.push(ItemChange {
            gtin,
            description,
            old_value: deductible.text,
            new_value: new_value.clone(),
        });
        Ok(())
    })?;

    tracing::info!("{} substances modified", report.modified.len());
    tracing::debug!(
        "{} items seen, {} already at {}%, {} without DEDUCTIBLE, {} not listed",
        report.items_seen,
        report.already_set,
        new_value,
        report.without_deductible,
        report.not_listed
    );

    Ok(PatchedCatalog {
        data: apply_splices(xml, &splices),
        report,
    })
}
