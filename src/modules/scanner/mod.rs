//! Image decoding and OCR through the `tesseract` executable.

mod decoder;
mod tesseract;

pub use decoder::decode_image;
pub use tesseract::TesseractRecognizer;
