//! Evidence attached to assistant replies.
//!
//! A reply may come back with any number of related security events. Only
//! the first [`MAX_EVIDENCE_PER_REPLY`] are kept, in server order; the rest
//! are dropped without telling the user. Once attached to a message the list
//! cannot be changed.

use std::sync::Arc;

use reqwest::Url;
use tracing::{debug, warn};

use chowkidaar_net::{ImageKind, MediaUrls};
use chowkidaar_shared::constants::MAX_EVIDENCE_PER_REPLY;
use chowkidaar_shared::EvidenceRef;

/// An immutable, capped list of evidence records.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedEvidence(Arc<[EvidenceRef]>);

impl BoundedEvidence {
    pub fn records(&self) -> &[EvidenceRef] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EvidenceRef> {
        self.0.iter()
    }
}

/// Bound the raw records of a reply. Returns `None` when there is nothing to
/// attach.
pub fn correlate(mut records: Vec<EvidenceRef>) -> Option<BoundedEvidence> {
    if records.is_empty() {
        return None;
    }
    if records.len() > MAX_EVIDENCE_PER_REPLY {
        debug!(
            received = records.len(),
            kept = MAX_EVIDENCE_PER_REPLY,
            "Truncating reply evidence"
        );
        records.truncate(MAX_EVIDENCE_PER_REPLY);
    }
    Some(BoundedEvidence(records.into()))
}

/// What to show in the image slot of an evidence card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Authenticated URL of the stored image.
    Remote(Url),
    /// No image available (none stored, or it failed to load).
    Placeholder,
}

impl ImageSource {
    /// Resolve the image slot of `record`.
    ///
    /// Records without the requested reference get a placeholder; that is a
    /// normal state, not an error.
    pub fn resolve(record: &EvidenceRef, media: &MediaUrls, kind: ImageKind) -> Self {
        let has_reference = match kind {
            ImageKind::Frame => record.frame.is_some(),
            ImageKind::Thumbnail => record.thumbnail.is_some(),
        };
        if !has_reference {
            return ImageSource::Placeholder;
        }

        match media.event_image(record.id, kind) {
            Ok(url) => ImageSource::Remote(url),
            Err(e) => {
                warn!(event = %record.id, error = %e, "Could not build evidence image URL");
                ImageSource::Placeholder
            }
        }
    }

    /// The image failed to load. Only the visual degrades; the record stays.
    pub fn degrade(self) -> Self {
        ImageSource::Placeholder
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ImageSource::Placeholder)
    }
}

/// A record paired with its resolved image slot, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceCard {
    pub record: EvidenceRef,
    pub image: ImageSource,
}

impl EvidenceCard {
    /// Mark the image as failed to load.
    pub fn image_failed(&mut self) {
        let image = std::mem::replace(&mut self.image, ImageSource::Placeholder);
        self.image = image.degrade();
    }
}

/// Build one card per record. Prefers the thumbnail when the server stored one.
pub fn cards(evidence: &BoundedEvidence, media: &MediaUrls) -> Vec<EvidenceCard> {
    evidence
        .iter()
        .map(|record| {
            let kind = if record.thumbnail.is_some() {
                ImageKind::Thumbnail
            } else {
                ImageKind::Frame
            };
            EvidenceCard {
                image: ImageSource::resolve(record, media, kind),
                record: record.clone(),
            }
        })
        .collect()
}
