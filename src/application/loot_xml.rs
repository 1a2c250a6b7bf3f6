//! Streaming rescale of `loot.xml` documents
//!
//! The document is read as a quick-xml event stream and written back event by
//! event. Only the start tags of `item`/`block` elements directly inside a
//! `lootcontainer` are rebuilt; every other byte of the input is copied through
//! as-is.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{CountValue, DomainError, ElementKind, Multiplier};

/// Tag of the elements whose children get rescaled.
pub const CONTAINER_TAG: &str = "lootcontainer";

/// Attribute holding the loot amount.
pub const COUNT_ATTR: &str = "count";

const UTF8_BOM: &str = "\u{feff}";

/// What to do with a `count` value that is neither `n` nor `min,max`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum InvalidCountPolicy {
    /// Fail without touching the file
    #[default]
    Abort,
    /// Keep the value, report it as a warning
    Warn,
    /// Keep the value silently
    Skip,
}

impl fmt::Display for InvalidCountPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Abort => "abort",
            Self::Warn => "warn",
            Self::Skip => "skip",
        })
    }
}

/// A `count` value left untouched because it could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCount {
    pub kind: ElementKind,
    pub value: String,
    pub reason: String,
    /// Byte offset just past the offending tag
    pub position: u64,
}

/// Counters collected during a rescale pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RescaleStats {
    pub containers: usize,
    pub items: usize,
    pub blocks: usize,
    pub invalid: Vec<InvalidCount>,
}

impl RescaleStats {
    /// Number of `count` attributes that were rewritten.
    pub fn rescaled(&self) -> usize {
        self.items + self.blocks
    }
}

/// Rescaled XML text plus what happened while producing it.
#[derive(Debug, Clone)]
pub struct RescaledDocument {
    pub xml: String,
    pub stats: RescaleStats,
}

/// Rescale every `count` on `item`/`block` children of `lootcontainer` elements.
///
/// `origin` is only used to label errors. Nothing is returned unless the whole
/// document was processed, so callers can write the result in one go.
pub fn rescale_loot_xml(
    xml: &str,
    origin: &Path,
    multiplier: Multiplier,
    policy: InvalidCountPolicy,
) -> ApplicationResult<RescaledDocument> {
    let mut rescaler = LootRescaler {
        origin: origin.to_path_buf(),
        multiplier,
        policy,
        stats: RescaleStats::default(),
    };
    let xml = rescaler.run(xml)?;
    Ok(RescaledDocument {
        xml,
        stats: rescaler.stats,
    })
}

struct LootRescaler {
    origin: PathBuf,
    multiplier: Multiplier,
    policy: InvalidCountPolicy,
    stats: RescaleStats,
}

impl LootRescaler {
    fn run(&mut self, xml: &str) -> ApplicationResult<String> {
        let mut reader = Reader::from_str(xml);
        let mut writer = Writer::new(Vec::with_capacity(xml.len()));
        // The reader drops a leading BOM; put it back so the file keeps its encoding marker.
        if xml.starts_with(UTF8_BOM) {
            writer.get_mut().extend_from_slice(UTF8_BOM.as_bytes());
        }
        let mut open: Vec<Vec<u8>> = Vec::new();
        let mut roots = 0usize;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| self.malformed(reader.buffer_position() as u64, e))?;
            let position = reader.buffer_position() as u64;

            match event {
                Event::Eof => break,
                Event::Start(start) => {
                    self.check_root(&open, &mut roots, position)?;
                    let name = start.name().as_ref().to_vec();
                    let start = self.visit(start, open.last(), position)?;
                    if name == CONTAINER_TAG.as_bytes() {
                        self.stats.containers += 1;
                    }
                    open.push(name);
                    self.write(&mut writer, Event::Start(start))?;
                }
                Event::Empty(start) => {
                    self.check_root(&open, &mut roots, position)?;
                    if start.name().as_ref() == CONTAINER_TAG.as_bytes() {
                        self.stats.containers += 1;
                    }
                    let start = self.visit(start, open.last(), position)?;
                    self.write(&mut writer, Event::Empty(start))?;
                }
                Event::End(end) => {
                    if open.pop().is_none() {
                        return Err(self.malformed(position, "closing tag without opening tag"));
                    }
                    self.write(&mut writer, Event::End(end))?;
                }
                Event::Text(text)
                    if open.is_empty() && !text.iter().all(u8::is_ascii_whitespace) =>
                {
                    return Err(self.malformed(position, "text outside the root element"));
                }
                other => self.write(&mut writer, other)?,
            }
        }

        if let Some(name) = open.last() {
            let message = format!("unclosed element <{}>", String::from_utf8_lossy(name));
            return Err(self.malformed(xml.len() as u64, message));
        }
        if roots == 0 {
            return Err(self.malformed(xml.len() as u64, "no root element found"));
        }

        debug!(
            "rescaled {} items and {} blocks in {} containers",
            self.stats.items, self.stats.blocks, self.stats.containers
        );
        String::from_utf8(writer.into_inner()).map_err(|e| ApplicationError::OperationFailed {
            context: format!("encode {}", self.origin.display()),
            source: Box::new(e),
        })
    }

    fn check_root(
        &self,
        open: &[Vec<u8>],
        roots: &mut usize,
        position: u64,
    ) -> ApplicationResult<()> {
        if open.is_empty() {
            *roots += 1;
            if *roots > 1 {
                return Err(self.malformed(position, "more than one root element"));
            }
        }
        Ok(())
    }

    /// Rewrite `start` if it is a loot entry directly inside a container.
    fn visit<'a>(
        &mut self,
        start: BytesStart<'a>,
        parent: Option<&Vec<u8>>,
        position: u64,
    ) -> ApplicationResult<BytesStart<'a>> {
        let in_container = parent.is_some_and(|p| p.as_slice() == CONTAINER_TAG.as_bytes());
        let kind = match ElementKind::from_tag(start.name().as_ref()) {
            Some(kind) if in_container => kind,
            _ => return Ok(start),
        };

        let Some(raw) = self.count_attribute(&start, position)? else {
            return Ok(start);
        };
        // An empty count carries no amount; leave it as written.
        if raw.is_empty() {
            return Ok(start);
        }

        let scaled = match CountValue::parse(&raw, kind) {
            Ok(value) => value.scale(self.multiplier),
            Err(err) => {
                self.reject(err, position)?;
                return Ok(start);
            }
        };
        trace!("{kind} count {raw:?} -> {scaled}");

        match kind {
            ElementKind::Item => self.stats.items += 1,
            ElementKind::Block => self.stats.blocks += 1,
        }
        self.with_count(&start, &scaled.to_string(), position)
    }

    fn count_attribute(
        &self,
        start: &BytesStart<'_>,
        position: u64,
    ) -> ApplicationResult<Option<String>> {
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.malformed(position, e))?;
            if attr.key.as_ref() == COUNT_ATTR.as_bytes() {
                let value = attr
                    .unescape_value()
                    .map_err(|e| self.malformed(position, e))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    /// Copy of `start` with the `count` attribute replaced, attribute order kept.
    fn with_count(
        &self,
        start: &BytesStart<'_>,
        count: &str,
        position: u64,
    ) -> ApplicationResult<BytesStart<'static>> {
        let mut rewritten = start.clone().into_owned();
        rewritten.clear_attributes();

        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.malformed(position, e))?;
            if attr.key.as_ref() == COUNT_ATTR.as_bytes() {
                rewritten.push_attribute((COUNT_ATTR, count));
            } else if attr.value.contains(&b'"') {
                // Value was single-quoted; re-escape so it survives double quotes.
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                let value = attr
                    .unescape_value()
                    .map_err(|e| self.malformed(position, e))?
                    .into_owned();
                rewritten.push_attribute(Attribute::from((key.as_str(), value.as_str())));
            } else {
                rewritten.push_attribute(attr);
            }
        }
        Ok(rewritten)
    }

    fn reject(&mut self, err: DomainError, position: u64) -> ApplicationResult<()> {
        match (self.policy, err) {
            (InvalidCountPolicy::Abort, err) => Err(err.into()),
            (policy, DomainError::InvalidCount { kind, value, reason }) => {
                debug!("{policy}: keeping invalid {kind} count {value:?}: {reason}");
                self.stats.invalid.push(InvalidCount {
                    kind,
                    value,
                    reason,
                    position,
                });
                Ok(())
            }
            (_, err) => Err(err.into()),
        }
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> ApplicationResult<()> {
        writer
            .write_event(event)
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("serialize {}", self.origin.display()),
                source: Box::new(e),
            })
    }

    fn malformed(&self, position: u64, message: impl fmt::Display) -> ApplicationError {
        ApplicationError::MalformedDocument {
            path: self.origin.clone(),
            position,
            message: message.to_string(),
        }
    }
}
