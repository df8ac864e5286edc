use crate::api::oracle_client::{strip_code_fences, OracleError, VisionOracle};
use crate::api::oracle_structs::{BoundingBox, DetectionEntry, Part};

#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),
    #[error("malformed detection response: {0}")]
    Malformed(String),
}

const DETECT_PROMPT: &str = "Detect every human face in this image. Respond with only a JSON array, one entry per face, each of the form {\"box_2d\": [ymin, xmin, ymax, xmax]} with integer coordinates normalized to a 0-1000 scale. Respond with [] if the image contains no faces.";

/// Asks the oracle for all face bounding boxes in one image. An empty list
/// is a valid result; a response that does not parse as a list of
/// four-integer boxes fails the whole photo.
///
/// # Errors
/// On transport failure or a malformed response.
pub async fn detect_faces(
    oracle: &dyn VisionOracle,
    image: &[u8],
    mime_type: &str,
) -> Result<Vec<BoundingBox>, DetectionError> {
    let parts = vec![
        Part::text(DETECT_PROMPT),
        Part::inline_image(mime_type, image),
    ];
    let text = oracle.generate(parts).await?;
    parse_detection_response(&text)
}

/// # Errors
/// When the text is not a JSON array of `{"box_2d": [y, x, y, x]}` entries.
pub fn parse_detection_response(text: &str) -> Result<Vec<BoundingBox>, DetectionError> {
    let payload = strip_code_fences(text);
    let entries: Vec<DetectionEntry> =
        serde_json::from_str(payload).map_err(|e| DetectionError::Malformed(e.to_string()))?;

    entries
        .into_iter()
        .map(|entry| {
            let [ymin, xmin, ymax, xmax]: [i64; 4] = entry
                .box_2d
                .try_into()
                .map_err(|coords: Vec<i64>| {
                    DetectionError::Malformed(format!(
                        "expected 4 box coordinates, got {}",
                        coords.len()
                    ))
                })?;
            Ok(BoundingBox {
                ymin: to_coord(ymin)?,
                xmin: to_coord(xmin)?,
                ymax: to_coord(ymax)?,
                xmax: to_coord(xmax)?,
            })
        })
        .collect()
}

fn to_coord(value: i64) -> Result<i32, DetectionError> {
    i32::try_from(value)
        .map_err(|_| DetectionError::Malformed(format!("box coordinate out of range: {value}")))
}
