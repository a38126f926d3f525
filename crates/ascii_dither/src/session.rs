//! Latest-request-wins conversion.
//!
//! Every submitted conversion is issued a [`RequestToken`]. Image decoding is the only point
//! where a conversion suspends; once it resumes, a request whose token is no longer the most
//! recently issued one is dropped without touching the session state.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::ascii::calibrate::CharsetSpec;
use crate::image_pipeline::loader::{DecodedImage, ImageCache};
use crate::{AsciiConverter, AsciiError, ConversionResult, ConvertParams};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Hands out monotonically increasing tokens and remembers the newest one.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::Acquire) == token.0
    }
}

#[derive(Debug)]
pub enum Outcome {
    Completed(Arc<ConversionResult>),
    /// A newer request was issued while this one was decoding.
    Superseded,
}

impl Outcome {
    pub fn completed(self) -> Option<Arc<ConversionResult>> {
        match self {
            Outcome::Completed(result) => Some(result),
            Outcome::Superseded => None,
        }
    }
}

/// Conversion state owned by one caller: scratch buffers, decoded images and the last
/// published result.
#[derive(Default)]
pub struct ConversionSession {
    tracker: RequestTracker,
    converter: Mutex<AsciiConverter>,
    images: Mutex<ImageCache>,
    latest: Mutex<Option<Arc<ConversionResult>>>,
}

impl ConversionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts the image identified by `source_key`.
    ///
    /// `decode` is only awaited when no decoded image is cached for `source_key`. Decode and
    /// validation failures are returned for the newest request only; stale requests resolve
    /// to [`Outcome::Superseded`].
    pub async fn submit<F>(
        &self,
        source_key: &str,
        decode: F,
        charset: &CharsetSpec,
        params: &ConvertParams,
    ) -> Result<Outcome, AsciiError>
    where
        F: Future<Output = Result<DecodedImage, AsciiError>>,
    {
        let token = self.tracker.issue();

        let cached = self.images.lock().get(source_key);
        let image = match cached {
            Some(image) => image,
            None => {
                let decoded = decode.await;
                if !self.tracker.is_current(token) {
                    debug!("dropping superseded request {token:?} for {source_key:?}");
                    return Ok(Outcome::Superseded);
                }

                let image = Arc::new(decoded?);
                self.images.lock().insert(source_key, Arc::clone(&image));
                image
            },
        };

        let result = Arc::new(self.converter.lock().convert(&image, charset, params)?);

        let mut latest = self.latest.lock();
        if !self.tracker.is_current(token) {
            debug!("dropping superseded result {token:?} for {source_key:?}");
            return Ok(Outcome::Superseded);
        }
        *latest = Some(Arc::clone(&result));
        Ok(Outcome::Completed(result))
    }

    /// Most recent result published by a non-superseded request.
    pub fn latest(&self) -> Option<Arc<ConversionResult>> {
        self.latest.lock().clone()
    }

    /// Forgets the decoded image of a source the caller has discarded.
    pub fn release_cached_image(&self, source_key: &str) -> bool {
        self.images.lock().release(source_key)
    }

    pub fn cached_images(&self) -> usize {
        self.images.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_token_is_current() {
        let tracker = RequestTracker::default();
        let first = tracker.issue();
        assert!(tracker.is_current(first));

        let second = tracker.issue();
        assert!(second > first);
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
    }
}
