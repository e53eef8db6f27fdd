//! Extractor registry keyed by document format.

use docread_core::{ContentExtractor, DocumentFormat, OcrEngine};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    ImageExtractor, PdfExtractor, PresentationExtractor, SpreadsheetExtractor, WordExtractor,
};

/// Registry of content extractors.
pub struct ExtractorRegistry {
    extractors: HashMap<DocumentFormat, Arc<dyn ContentExtractor>>,
}

impl ExtractorRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Registry with the built-in extractor for every format.
    #[must_use]
    pub fn with_defaults(ocr: Arc<dyn OcrEngine>) -> Self {
        let mut registry = Self::new();
        registry.register(PdfExtractor::new(Arc::clone(&ocr)));
        registry.register(ImageExtractor::new(Arc::clone(&ocr)));
        registry.register(WordExtractor::new(Arc::clone(&ocr)));
        registry.register(PresentationExtractor::new(ocr));
        registry.register(SpreadsheetExtractor::new());
        registry
    }

    /// Register an extractor, replacing any previous one for its format.
    pub fn register<E: ContentExtractor + 'static>(&mut self, extractor: E) {
        self.extractors.insert(extractor.format(), Arc::new(extractor));
    }

    #[must_use]
    pub fn get(&self, format: DocumentFormat) -> Option<Arc<dyn ContentExtractor>> {
        self.extractors.get(&format).cloned()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
