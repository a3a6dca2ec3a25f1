//! PDF text and image extraction using lopdf and pdf-extract.

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    /// Resources dictionary of a page, following `Parent` links for
    /// inherited resources.
    fn page_resources(&self, doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
        let mut node_id = page_id;
        loop {
            let node = doc.get_dictionary(node_id).ok()?;
            if let Ok(resources) = node.get(b"Resources") {
                if let Ok((_, Object::Dictionary(dict))) = doc.dereference(resources) {
                    return Some(dict.clone());
                }
            }
            match node.get(b"Parent") {
                Ok(Object::Reference(parent)) => node_id = *parent,
                _ => return None,
            }
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads the bytes again, so hand it the decrypted copy
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_page_texts(&self, max_pages: usize) -> Result<Vec<String>> {
        self.document()?;

        let mut pages = pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        if max_pages > 0 && pages.len() > max_pages {
            warn!("Only the first {} of {} pages are extracted", max_pages, pages.len());
            pages.truncate(max_pages);
        }

        debug!(
            "Extracted text from {} pages ({} chars)",
            pages.len(),
            pages.iter().map(String::len).sum::<usize>()
        );
        Ok(pages)
    }

    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;
        let pages = doc.get_pages();
        let page_id = *pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let images: Vec<DynamicImage> = self
            .page_resources(doc, page_id)
            .and_then(|resources| {
                let xobjects = resources.get(b"XObject").ok()?;
                match doc.dereference(xobjects).ok()? {
                    (_, Object::Dictionary(dict)) => Some(
                        dict.iter()
                            .filter_map(|(_, reference)| doc.dereference(reference).ok())
                            .filter_map(|(_, object)| decode_image_object(doc, object))
                            .collect(),
                    ),
                    _ => None,
                }
            })
            .unwrap_or_default();

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }

    fn extract_all_images(&self) -> Vec<DynamicImage> {
        let Some(doc) = self.document.as_ref() else {
            return Vec::new();
        };

        let images: Vec<DynamicImage> = doc
            .objects
            .values()
            .filter_map(|object| decode_image_object(doc, object))
            .collect();

        debug!("Found {} images in document", images.len());
        images
    }
}

/// Decode an image XObject stream, if it is one in a supported encoding.
fn decode_image_object(doc: &Document, object: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = object else {
        return None;
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
    let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;
    trace!("Found image object: {}x{}", width, height);

    let filter = dict.get(b"Filter").ok().and_then(|filter| match filter {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
        _ => None,
    });

    match filter {
        Some(b"DCTDecode") => {
            return image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg).ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("Skipping image with unsupported filter");
            return None;
        }
        _ => {}
    }

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    decode_raw(data, width, height, color_space)
}

/// Build an image from raw 8-bit samples.
fn decode_raw(mut data: Vec<u8>, width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = (width as usize).checked_mul(height as usize)?;

    match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => {
            data.truncate(pixels * 3);
            RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" if data.len() >= pixels => {
            data.truncate(pixels);
            GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
        }
        _ => {
            trace!(
                "Could not decode image: colorspace={}, data_len={}",
                String::from_utf8_lossy(color_space),
                data.len()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    /// One page whose only content is a 2x2 grayscale image.
    fn image_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 2,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0, 64, 128, 255],
        ));
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"q 2 0 0 2 0 0 cm /Im0 Do Q".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "Resources" => dictionary! {
                    "XObject" => dictionary! { "Im0" => image_id },
                },
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert!(matches!(extractor.extract_page_texts(0), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let mut extractor = PdfExtractor::new();
        let err = extractor.load(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_inherited_page_image_is_decoded() {
        let mut extractor = PdfExtractor::new();
        extractor.load(&image_pdf()).unwrap();
        assert_eq!(extractor.page_count(), 1);

        let images = extractor.extract_images(1).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!((images[0].width(), images[0].height()), (2, 2));

        assert!(matches!(extractor.extract_images(2), Err(PdfError::InvalidPage(2))));
        assert_eq!(extractor.extract_all_images().len(), 1);
    }

    #[test]
    fn test_short_raw_data_is_rejected() {
        assert!(decode_raw(vec![0; 3], 2, 2, b"DeviceGray").is_none());
        assert!(decode_raw(vec![0; 12], 2, 2, b"DeviceRGB").is_some());
        assert!(decode_raw(vec![0; 16], 2, 2, b"DeviceCMYK").is_none());
    }
}
