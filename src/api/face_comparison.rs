use tracing::warn;

use crate::api::oracle_client::{strip_code_fences, VisionOracle};
use crate::api::oracle_structs::{MatchResponse, Part};
use crate::common::blob_store::BlobStore;

/// One known identity cluster offered to the oracle: the person id and the
/// blob key of its representative face.
#[derive(Debug, Clone)]
pub struct ReferenceFace {
    pub person_id: i32,
    pub crop_key: String,
}

const COMPARE_PROMPT: &str = "The first image is a target face. Every image after it is a reference face preceded by a person id label. Decide whether the target shows the same individual as one of the references. Respond with only JSON of the form {\"match_id\": <id>} naming the matching label, or {\"match_id\": null} if no reference clearly shows the same person.";

/// Compares a target crop against every known person's representative face
/// and returns the matching person id, if any.
///
/// One oracle call per face, carrying the whole reference set. Skipped
/// entirely when there are no references. Every failure mode (transport,
/// unparsable response, id not among those offered, missing reference
/// blob) resolves to "no match" so oracle ambiguity can never block
/// cluster growth; the cost of a wrong answer is a duplicate cluster, not
/// a wrong merge.
pub async fn match_face(
    oracle: &dyn VisionOracle,
    blobs: &dyn BlobStore,
    target_crop: &[u8],
    references: &[ReferenceFace],
) -> Option<i32> {
    if references.is_empty() {
        return None;
    }

    let mut parts = Vec::with_capacity(2 + references.len() * 2);
    parts.push(Part::text(COMPARE_PROMPT));
    parts.push(Part::inline_image("image/jpeg", target_crop));

    for reference in references {
        let bytes = match blobs.get(&reference.crop_key).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(
                    "Reference crop {} unavailable, treating face as unmatched: {}",
                    reference.crop_key, err
                );
                return None;
            }
        };
        parts.push(Part::text(format!("Person {}:", reference.person_id)));
        parts.push(Part::inline_image("image/jpeg", &bytes));
    }

    let offered: Vec<i32> = references.iter().map(|r| r.person_id).collect();
    match oracle.generate(parts).await {
        Ok(text) => parse_match_response(&text, &offered),
        Err(err) => {
            warn!("Face comparison failed, treating face as unmatched: {}", err);
            None
        }
    }
}

/// Accepts only a `match_id` that numerically equals one of the offered
/// ids; anything else is "no match".
#[must_use]
pub fn parse_match_response(text: &str, offered: &[i32]) -> Option<i32> {
    let payload = strip_code_fences(text);
    let response: MatchResponse = serde_json::from_str(payload).ok()?;
    let id = i32::try_from(response.match_id?).ok()?;
    offered.contains(&id).then_some(id)
}
