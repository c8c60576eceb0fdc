//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{InvexConfig, OcrConfig};

use super::{OcrBackend, OcrResult, TextBox};

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Create an engine from detection/recognition models and a dictionary.
    pub fn from_paths(
        det_path: &Path,
        rec_path: &Path,
        dict_path: &Path,
        config: OcrConfig,
    ) -> Result<Self, OcrError> {
        for path in [det_path, rec_path, dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!("missing {}", path.display())));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(det_path)
            .rec_model_path(rec_path)
            .dictionary_path(dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", det_path.display());

        Ok(Self { engine, config })
    }

    fn fit_to_max_size(&self, image: &DynamicImage) -> Option<DynamicImage> {
        let (width, height) = image.dimensions();
        let max = self.config.max_image_size;
        if max == 0 || width.max(height) <= max {
            return None;
        }

        debug!("Downscaling {}x{} image to fit {}px", width, height, max);
        Some(image.resize(max, max, FilterType::Triangle))
    }
}

impl OcrBackend for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let start = Instant::now();

        let resized = self.fit_to_max_size(image);
        let image = resized.as_ref().unwrap_or(image);
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        info!("Processing image: {}x{}", width, height);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| {
                let text = if self.config.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                TextBox {
                    bbox: polygon_to_bbox(&r.bounding_box),
                    text,
                    score: r.confidence,
                }
            })
            .collect();

        let processing_time_ms = start.elapsed().as_millis() as u64;
        let result = OcrResult::from_boxes(boxes, (width, height), processing_time_ms);

        info!(
            "OCR complete: {} text boxes in {}ms",
            result.boxes.len(),
            processing_time_ms
        );

        Ok(result)
    }
}

/// Create an engine from the model files named in `config`, looked up in `model_dir`.
pub fn create_engine_from_dir(
    model_dir: &Path,
    config: &InvexConfig,
) -> Result<PureOcrEngine, OcrError> {
    PureOcrEngine::from_paths(
        &model_dir.join(&config.models.detection_model),
        &model_dir.join(&config.models.recognition_model),
        &model_dir.join(&config.models.dictionary),
        config.ocr.clone(),
    )
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_models_are_reported() {
        let config = InvexConfig::default();
        let err = create_engine_from_dir(Path::new("/no/such/models"), &config)
            .err()
            .unwrap();
        assert!(matches!(err, OcrError::ModelLoad(_)));
        assert!(err.to_string().contains("det.onnx"));
    }
}
