use std::sync::Arc;
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::core::{Dimensions, OptimizationOutcome, OptimizedImage, OptimizerConfig, Preset, SourceImage};
use crate::processing::codec::{Codec, ImageCodec};
use crate::processing::dimensions::calculate_dimensions;
use crate::processing::validation::{Admission, admit};
use crate::utils::{Clock, OptimizerError, OptimizerResult, SystemClock, sniff_mime};

/// Downscales and recompresses images for one upload target.
///
/// Holds only immutable configuration and shared collaborators, so clones are
/// cheap and concurrent [`optimize`](Self::optimize) calls never interfere.
pub struct ImageOptimizer<C: Codec = ImageCodec> {
    config: OptimizerConfig,
    codec: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<C: Codec> Clone for ImageOptimizer<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            codec: Arc::clone(&self.codec),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl ImageOptimizer<ImageCodec> {
    /// Optimizer using the native codec and the system clock.
    pub fn new(config: OptimizerConfig) -> Self {
        Self::with_codec(config, ImageCodec::new())
    }

    pub fn for_preset(preset: Preset) -> Self {
        debug!("Creating optimizer for preset {:?}", preset);
        Self::new(preset.config())
    }
}

impl<C: Codec> ImageOptimizer<C> {
    pub fn with_codec(config: OptimizerConfig, codec: C) -> Self {
        Self {
            config,
            codec: Arc::new(codec),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Validates, decodes, downscales and re-encodes `source`.
    ///
    /// Validation (size ceiling, image type, vector bypass) happens before any
    /// decode work. Vector images come back unchanged. Every failure is a
    /// distinct [`OptimizerError`]; nothing partial is ever returned.
    pub async fn optimize(&self, source: &SourceImage) -> OptimizerResult<OptimizedImage> {
        if admit(source, &self.config)? == Admission::PassThrough {
            return Ok(OptimizedImage::passthrough(source));
        }

        debug!(
            "Optimizing '{}' ({} bytes, {})",
            source.name,
            source.size_bytes(),
            source.mime_type
        );

        let raster = self
            .codec
            .decode(Arc::clone(&source.data), &source.mime_type)
            .await
            .map_err(|e| log_failure(source, OptimizerError::from_decode_stage(e)))?;

        let natural = self.codec.dimensions(&raster);
        let target = calculate_dimensions(natural, &self.config)
            .map_err(|e| log_failure(source, e))?;
        debug!("'{}': {} → {}", source.name, natural, target);

        let surface = self
            .codec
            .draw(raster, target)
            .await
            .map_err(|e| log_failure(source, OptimizerError::from_encode_stage(e)))?;

        let format = self.config.output_format();
        let bytes = self
            .codec
            .encode(surface, format, self.config.quality())
            .await
            .map_err(|e| log_failure(source, OptimizerError::from_encode_stage(e)))?;

        if bytes.is_empty() {
            return Err(log_failure(source, OptimizerError::encode("encoder returned no data")));
        }

        if self.should_keep_original(source, natural, target, bytes.len()) {
            debug!(
                "'{}' re-encoded to {} bytes, larger than the original; keeping source",
                source.name,
                bytes.len()
            );
            return Ok(OptimizedImage {
                dimensions: Some(natural),
                outcome: OptimizationOutcome::KeptOriginal,
                ..OptimizedImage::passthrough(source)
            });
        }

        let optimized = OptimizedImage {
            name: source.name.clone(),
            mime_type: format.mime_type().to_string(),
            data: Arc::from(bytes),
            last_modified_ms: self.clock.now_ms(),
            original_size: source.size_bytes(),
            dimensions: Some(target),
            outcome: OptimizationOutcome::Reencoded,
        };

        debug!(
            "'{}' optimized: {} → {} bytes ({:.1}% saved)",
            optimized.name,
            optimized.original_size,
            optimized.size_bytes(),
            optimized.compression_ratio()
        );

        Ok(optimized)
    }

    /// Optimizes every source concurrently; results keep the input order.
    pub async fn optimize_batch(&self, sources: &[SourceImage]) -> Vec<OptimizerResult<OptimizedImage>> {
        debug!("Optimizing batch of {} images", sources.len());
        join_all(sources.iter().map(|source| self.optimize(source))).await
    }

    /// An untouched-size source already in the target format is never replaced by a bigger copy.
    ///
    /// Both the declared type and the sniffed container must match the target,
    /// otherwise the kept bytes would be mislabelled.
    fn should_keep_original(
        &self,
        source: &SourceImage,
        natural: Dimensions,
        target: Dimensions,
        encoded_len: usize,
    ) -> bool {
        let target_mime = self.config.output_format().mime_type();
        natural == target
            && encoded_len as u64 > source.size_bytes()
            && source.mime_type.eq_ignore_ascii_case(target_mime)
            && sniff_mime(&source.data) == Some(target_mime)
    }
}

fn log_failure(source: &SourceImage, err: OptimizerError) -> OptimizerError {
    warn!("Image optimization failed for '{}': {}", source.name, err);
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use async_trait::async_trait;
    use crate::utils::{CodecError, FixedClock, OutputFormat};

    /// Raster stand-in that only knows its size.
    #[derive(Debug)]
    struct FakeRaster(Dimensions);

    #[derive(Default)]
    struct FakeCodec {
        natural: Option<Dimensions>,
        encoded_len: usize,
        fail_encode: bool,
        decodes: AtomicUsize,
        draws: AtomicUsize,
    }

    impl FakeCodec {
        fn sized(width: u32, height: u32, encoded_len: usize) -> Self {
            Self {
                natural: Some(Dimensions::new(width, height)),
                encoded_len,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl Codec for FakeCodec {
        type Raster = FakeRaster;

        async fn decode(&self, _bytes: Arc<[u8]>, _mime_type: &str) -> Result<FakeRaster, CodecError> {
            self.decodes.fetch_add(1, Ordering::SeqCst);
            self.natural
                .map(FakeRaster)
                .ok_or_else(|| CodecError::Decode("corrupt data".into()))
        }

        fn dimensions(&self, raster: &FakeRaster) -> Dimensions {
            raster.0
        }

        async fn draw(&self, _raster: FakeRaster, target: Dimensions) -> Result<FakeRaster, CodecError> {
            self.draws.fetch_add(1, Ordering::SeqCst);
            Ok(FakeRaster(target))
        }

        async fn encode(
            &self,
            _raster: FakeRaster,
            _format: OutputFormat,
            _quality: f32,
        ) -> Result<Vec<u8>, CodecError> {
            if self.fail_encode {
                return Err(CodecError::EmptyOutput);
            }
            Ok(vec![0xAB; self.encoded_len])
        }
    }

    fn optimizer(codec: FakeCodec) -> ImageOptimizer<FakeCodec> {
        ImageOptimizer::with_codec(Preset::ProfilePicture.config(), codec)
            .with_clock(Arc::new(FixedClock::new(1_700_000_000_000)))
    }

    fn png(size: usize) -> SourceImage {
        SourceImage::new("me.png", "image/png", vec![1u8; size], 5)
    }

    #[tokio::test]
    async fn reencodes_to_jpeg_with_fresh_timestamp() {
        let opt = optimizer(FakeCodec::sized(1200, 800, 300));
        let out = opt.optimize(&png(4000)).await.unwrap();

        assert_eq!(out.name, "me.png");
        assert_eq!(out.mime_type, "image/jpeg");
        assert_eq!(out.size_bytes(), 300);
        assert_eq!(out.original_size, 4000);
        assert_eq!(out.last_modified_ms, 1_700_000_000_000);
        assert_eq!(out.dimensions, Some(Dimensions::new(300, 200)));
        assert_eq!(out.outcome, OptimizationOutcome::Reencoded);
    }

    #[tokio::test]
    async fn oversized_input_fails_before_decode() {
        let opt = optimizer(FakeCodec::sized(10, 10, 1));
        let err = opt.optimize(&png(3 * 1_048_576 + 1)).await.unwrap_err();

        assert_eq!(err.kind(), "FileTooLarge");
        assert_eq!(opt.codec.decodes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_image_fails_before_decode() {
        let opt = optimizer(FakeCodec::sized(10, 10, 1));
        let source = SourceImage::new("notes.txt", "text/plain", b"hello".to_vec(), 0);
        let err = opt.optimize(&source).await.unwrap_err();

        assert_eq!(err.kind(), "NotAnImage");
        assert_eq!(opt.codec.decodes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn svg_is_returned_identical() {
        let opt = optimizer(FakeCodec::sized(10, 10, 1));
        let source = SourceImage::new("logo.svg", "image/svg+xml", b"<svg/>".to_vec(), 9);
        let out = opt.optimize(&source).await.unwrap();

        assert!(Arc::ptr_eq(&out.data, &source.data));
        assert_eq!(out.mime_type, "image/svg+xml");
        assert_eq!(out.last_modified_ms, 9);
        assert_eq!(opt.codec.decodes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn decode_failure_is_typed() {
        let opt = optimizer(FakeCodec::default());
        let err = opt.optimize(&png(10)).await.unwrap_err();
        assert_eq!(err, OptimizerError::ImageDecode("corrupt data".into()));
    }

    #[tokio::test]
    async fn encode_failure_is_typed() {
        let codec = FakeCodec {
            fail_encode: true,
            ..FakeCodec::sized(100, 100, 0)
        };
        let err = optimizer(codec).optimize(&png(10)).await.unwrap_err();
        assert_eq!(err.kind(), "EncodeFailed");
    }

    #[tokio::test]
    async fn empty_encoder_output_is_an_encode_failure() {
        let err = optimizer(FakeCodec::sized(100, 100, 0)).optimize(&png(10)).await.unwrap_err();
        assert_eq!(err.kind(), "EncodeFailed");
    }

    #[tokio::test]
    async fn zero_sized_decode_is_rejected() {
        let err = optimizer(FakeCodec::sized(0, 50, 10)).optimize(&png(10)).await.unwrap_err();
        assert_eq!(err, OptimizerError::InvalidImageDimensions { width: 0, height: 50 });
    }

    fn with_magic(magic: &[u8], size: usize) -> Vec<u8> {
        let mut data = magic.to_vec();
        data.resize(size, 3);
        data
    }

    #[tokio::test]
    async fn small_jpeg_that_would_grow_is_kept() {
        let opt = optimizer(FakeCodec::sized(100, 100, 5000));
        let data = with_magic(&[0xFF, 0xD8, 0xFF, 0xE0], 1000);
        let source = SourceImage::new("tiny.jpg", "image/jpeg", data, 77);
        let out = opt.optimize(&source).await.unwrap();

        assert_eq!(out.outcome, OptimizationOutcome::KeptOriginal);
        assert!(Arc::ptr_eq(&out.data, &source.data));
        assert_eq!(out.last_modified_ms, 77);
    }

    #[tokio::test]
    async fn png_declared_as_jpeg_is_reencoded() {
        let opt = optimizer(FakeCodec::sized(100, 100, 5000));
        let data = with_magic(b"\x89PNG\r\n\x1a\n", 1000);
        let source = SourceImage::new("renamed.jpg", "image/jpeg", data, 77);
        let out = opt.optimize(&source).await.unwrap();

        assert_eq!(out.outcome, OptimizationOutcome::Reencoded);
        assert!(!Arc::ptr_eq(&out.data, &source.data));
        assert_eq!(out.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn format_conversion_may_grow() {
        let opt = optimizer(FakeCodec::sized(100, 100, 5000));
        let out = opt.optimize(&png(1000)).await.unwrap();
        assert_eq!(out.outcome, OptimizationOutcome::Reencoded);
        assert_eq!(out.saved_bytes(), -4000);
    }

    #[tokio::test]
    async fn batch_keeps_order_and_isolates_failures() {
        let opt = optimizer(FakeCodec::sized(600, 600, 50));
        let sources = vec![
            png(100),
            SourceImage::new("doc.pdf", "application/pdf", vec![0u8; 10], 0),
            png(200),
        ];

        let results = opt.optimize_batch(&sources).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().original_size, 100);
        assert_eq!(results[1].as_ref().unwrap_err().kind(), "NotAnImage");
        assert_eq!(results[2].as_ref().unwrap().original_size, 200);
        assert_eq!(opt.codec.draws.load(Ordering::SeqCst), 2);
    }
}
