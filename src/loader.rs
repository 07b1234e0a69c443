use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::{debug, warn};

use crate::cache::MaskCache;
use crate::error::Error;
use crate::mask::{MaskRef, OccupancyBuffer};

/// Resolves a mask reference to encoded image bytes. Implementations run
/// on the loader's worker thread and may block.
pub trait MaskSource: Send + 'static {
    fn fetch(&self, mask: &MaskRef) -> Result<Vec<u8>, Error>;
}

/// Reads mask references from a local directory tree. References shaped
/// like `/static/masks/<video>/<file>` resolve relative to `root` with
/// the `/static/` prefix stripped.
pub struct FileMaskSource {
    root: PathBuf,
}

impl FileMaskSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MaskSource for FileMaskSource {
    fn fetch(&self, mask: &MaskRef) -> Result<Vec<u8>, Error> {
        let reference = mask.as_str();
        let relative = reference
            .strip_prefix("/static/")
            .unwrap_or_else(|| reference.trim_start_matches('/'));
        std::fs::read(self.root.join(relative))
            .map_err(|e| Error::MaskDecode(format!("{mask}: {e}")))
    }
}

struct FetchJob {
    mask: MaskRef,
    epoch: u64,
    target: (u32, u32),
}

struct FetchDone {
    mask: MaskRef,
    epoch: u64,
    result: Result<OccupancyBuffer, Error>,
}

/// Outcome counts for one drain pass. Stale discards are an expected
/// consequence of seeking, not a failure.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainStats {
    pub inserted: usize,
    pub stale_discarded: usize,
    pub failed: usize,
}

/// Fetches and decodes masks off the render thread. Requests are stamped
/// with the loader's current epoch; bumping the epoch when playback jumps
/// marks everything still in flight as stale, and stale completions are
/// discarded at drain time instead of being inserted into the cache.
///
/// A reference whose fetch or decode fails is remembered and never
/// requested again for the life of the loader.
pub struct MaskLoader {
    jobs: Sender<FetchJob>,
    done: Receiver<FetchDone>,
    epoch: u64,
    pending: HashSet<MaskRef>,
    failed: HashSet<MaskRef>,
}

impl MaskLoader {
    pub fn spawn<S: MaskSource>(source: S) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<FetchJob>();
        let (done_tx, done_rx) = mpsc::channel();

        thread::spawn(move || {
            while let Ok(job) = job_rx.recv() {
                let FetchJob {
                    mask,
                    epoch,
                    target,
                } = job;
                let result = source
                    .fetch(&mask)
                    .and_then(|bytes| OccupancyBuffer::decode(&bytes, target.0, target.1));
                if done_tx.send(FetchDone { mask, epoch, result }).is_err() {
                    break;
                }
            }
        });

        Self {
            jobs: job_tx,
            done: done_rx,
            epoch: 0,
            pending: HashSet::new(),
            failed: HashSet::new(),
        }
    }

    /// Queue a fetch for `mask`, decoded at `target_width x target_height`.
    /// A reference already in flight is not queued twice; one that failed
    /// before is not queued at all.
    pub fn request(&mut self, mask: &MaskRef, target_width: u32, target_height: u32) {
        if self.failed.contains(mask) || !self.pending.insert(mask.clone()) {
            return;
        }
        let job = FetchJob {
            mask: mask.clone(),
            epoch: self.epoch,
            target: (target_width, target_height),
        };
        if self.jobs.send(job).is_err() {
            warn!(mask = %mask, "mask worker is gone, dropping request");
            self.pending.remove(mask);
        }
    }

    /// Mark all in-flight fetches stale. Call when playback jumps so the
    /// completions for the abandoned position are discarded on arrival.
    pub fn bump_epoch(&mut self) {
        self.epoch += 1;
    }

    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[inline]
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Apply every completion that already arrived, without blocking.
    pub fn drain(&mut self, cache: &mut MaskCache) -> DrainStats {
        let mut stats = DrainStats::default();
        while let Ok(done) = self.done.try_recv() {
            self.apply(done, cache, &mut stats);
        }
        stats
    }

    /// Block until every queued fetch has completed and been applied.
    /// Intended for offline rendering and tests; the interactive path
    /// uses `drain`.
    pub fn wait_idle(&mut self, cache: &mut MaskCache) -> DrainStats {
        let mut stats = self.drain(cache);
        while !self.pending.is_empty() {
            match self.done.recv() {
                Ok(done) => self.apply(done, cache, &mut stats),
                Err(_) => break,
            }
        }
        stats
    }

    fn apply(&mut self, done: FetchDone, cache: &mut MaskCache, stats: &mut DrainStats) {
        self.pending.remove(&done.mask);
        if done.epoch != self.epoch {
            debug!(mask = %done.mask, "discarding stale mask fetch");
            stats.stale_discarded += 1;
            return;
        }
        match done.result {
            Ok(buffer) => {
                cache.insert_if_absent(done.mask, buffer);
                stats.inserted += 1;
            }
            Err(e) => {
                warn!(mask = %done.mask, error = %e, "mask fetch failed, giving up on this reference");
                self.failed.insert(done.mask);
                stats.failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageOutputFormat, Luma};
    use std::collections::HashMap;
    use std::io::Cursor;

    struct MapSource(HashMap<String, Vec<u8>>);

    impl MaskSource for MapSource {
        fn fetch(&self, mask: &MaskRef) -> Result<Vec<u8>, Error> {
            self.0
                .get(mask.as_str())
                .cloned()
                .ok_or_else(|| Error::MaskDecode(format!("{mask}: not found")))
        }
    }

    fn white_png(w: u32, h: u32) -> Vec<u8> {
        let img = GrayImage::from_pixel(w, h, Luma([255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageOutputFormat::Png).unwrap();
        buf.into_inner()
    }

    fn source_with(entries: &[(&str, Vec<u8>)]) -> MapSource {
        MapSource(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn fetch_decodes_into_cache() {
        let mut loader = MaskLoader::spawn(source_with(&[("m.png", white_png(2, 2))]));
        let mut cache = MaskCache::new();
        let r = MaskRef::new("m.png");

        loader.request(&r, 4, 4);
        let stats = loader.wait_idle(&mut cache);

        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.stale_discarded, 0);
        let buf = cache.get(&r).unwrap();
        assert_eq!((buf.width(), buf.height()), (4, 4));
        assert!(buf.is_occupied(3, 3));
        assert_eq!(loader.in_flight(), 0);
    }

    #[test]
    fn bumped_epoch_discards_completion() {
        let mut loader = MaskLoader::spawn(source_with(&[("m.png", white_png(2, 2))]));
        let mut cache = MaskCache::new();
        let r = MaskRef::new("m.png");

        assert_eq!(loader.epoch(), 0);
        loader.request(&r, 4, 4);
        loader.bump_epoch();
        assert_eq!(loader.epoch(), 1);
        let stats = loader.wait_idle(&mut cache);

        assert_eq!(stats.stale_discarded, 1);
        assert_eq!(stats.inserted, 0);
        assert!(cache.is_empty());
        // a later request for the same reference goes through
        loader.request(&r, 4, 4);
        let stats = loader.wait_idle(&mut cache);
        assert_eq!(stats.inserted, 1);
        assert!(cache.contains(&r));
    }

    #[test]
    fn failed_fetch_is_counted_not_cached() {
        let mut loader = MaskLoader::spawn(source_with(&[]));
        let mut cache = MaskCache::new();
        let r = MaskRef::new("missing.png");

        loader.request(&r, 4, 4);
        let stats = loader.wait_idle(&mut cache);

        assert_eq!(stats.failed, 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn failed_reference_is_not_requeued() {
        let mut loader = MaskLoader::spawn(source_with(&[]));
        let mut cache = MaskCache::new();
        let r = MaskRef::new("missing.png");

        loader.request(&r, 4, 4);
        let stats = loader.wait_idle(&mut cache);
        assert_eq!(stats.failed, 1);

        // the reference is remembered as broken, nothing goes back in flight
        loader.request(&r, 4, 4);
        assert_eq!(loader.in_flight(), 0);
        let stats = loader.wait_idle(&mut cache);
        assert_eq!(stats, DrainStats::default());
        assert!(cache.is_empty());
    }

    #[test]
    fn in_flight_reference_not_queued_twice() {
        let mut loader = MaskLoader::spawn(source_with(&[("m.png", white_png(2, 2))]));
        let mut cache = MaskCache::new();
        let r = MaskRef::new("m.png");

        loader.request(&r, 4, 4);
        loader.request(&r, 4, 4);
        loader.wait_idle(&mut cache);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn file_source_strips_static_prefix() {
        let root = std::env::temp_dir().join(format!("shoptrack-loader-{}", std::process::id()));
        let dir = root.join("masks/v1");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("m.png"), white_png(1, 1)).unwrap();

        let source = FileMaskSource::new(&root);
        let bytes = source.fetch(&MaskRef::new("/static/masks/v1/m.png")).unwrap();
        assert!(!bytes.is_empty());
        assert!(source.fetch(&MaskRef::new("/static/masks/v1/gone.png")).is_err());

        let _ = std::fs::remove_dir_all(&root);
    }
}
