use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::assets::fonts::FontBook;
use crate::assets::loader::{AssetLoader, ResolvedAssets};
use crate::assets::source::{AssetFetcher, DefaultFetcher};
use crate::config::ShotframeConfig;
use crate::foundation::error::{ShotError, ShotResult};
use crate::render::compositor::{Compositor, RenderPass};
use crate::render::surface::FrameRGBA;
use crate::scene::input::RenderInput;

/// A frame published to the visible surface.
#[derive(Clone, Debug)]
pub struct Committed {
    /// Monotonically increasing per session, starting at 1.
    pub generation: u64,
    /// Fingerprint of the input that produced the frame.
    pub fingerprint: u64,
    /// The rendered image.
    pub frame: Arc<FrameRGBA>,
}

/// Client side of a [`RenderSession`].
///
/// Dropping every handle lets the session finish its current work and return.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    requests: mpsc::UnboundedSender<RenderInput>,
    commits: watch::Receiver<Option<Committed>>,
    shutdown: CancellationToken,
}

impl SessionHandle {
    /// Ask for `input` to be rendered. Newer requests supersede older ones.
    pub fn request(&self, input: RenderInput) -> ShotResult<()> {
        self.requests
            .send(input)
            .map_err(|_| ShotError::Other(anyhow::anyhow!("render session has stopped")))
    }

    /// Receiver observing every commit.
    pub fn subscribe(&self) -> watch::Receiver<Option<Committed>> {
        self.commits.clone()
    }

    /// Most recently committed frame, if any.
    pub fn latest(&self) -> Option<Committed> {
        self.commits.borrow().clone()
    }

    /// Stop the session, abandoning any in-flight pass.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

enum LoadOutcome {
    Loaded(ShotResult<ResolvedAssets>),
    Superseded(RenderInput),
    Closed,
}

/// Drives render passes for a stream of change requests.
///
/// Requests are coalesced until a quiet window of `debounce` elapses, a request arriving while
/// a pass is loading assets abandons that pass, and only the latest completed pass is
/// committed. An input identical to the last cleanly committed one is not rendered again.
///
/// The session is driven by awaiting [`RenderSession::run`]; it needs no `Send` bound, so it
/// works on a current-thread runtime or a `LocalSet`.
pub struct RenderSession<F = DefaultFetcher> {
    loader: AssetLoader<F>,
    compositor: Compositor,
    debounce: Duration,
    requests: mpsc::UnboundedReceiver<RenderInput>,
    commits: watch::Sender<Option<Committed>>,
    shutdown: CancellationToken,
}

impl RenderSession<DefaultFetcher> {
    /// Session using the default fetcher, fonts and options from `config`.
    pub fn from_config(config: &ShotframeConfig) -> ShotResult<(Self, SessionHandle)> {
        let fonts = FontBook::from_files(&config.fonts, config.fallback_family.clone())?;
        let fetcher = DefaultFetcher::new(&config.assets_root);
        Ok(Self::new(config, fetcher, fonts))
    }
}

impl<F: AssetFetcher> RenderSession<F> {
    /// Session with an explicit fetcher and font book.
    pub fn new(config: &ShotframeConfig, fetcher: F, fonts: FontBook) -> (Self, SessionHandle) {
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (commit_tx, commit_rx) = watch::channel(None);
        let shutdown = CancellationToken::new();
        let session = Self {
            loader: AssetLoader::new(fetcher, config.asset_cache_capacity),
            compositor: Compositor::new(config.render, fonts),
            debounce: Duration::from_millis(config.debounce_ms),
            requests: req_rx,
            commits: commit_tx,
            shutdown: shutdown.clone(),
        };
        let handle = SessionHandle {
            requests: req_tx,
            commits: commit_rx,
            shutdown,
        };
        (session, handle)
    }

    /// Process requests until every handle is dropped or the session is shut down.
    pub async fn run(self) -> ShotResult<()> {
        let Self {
            mut loader,
            mut compositor,
            debounce,
            mut requests,
            commits,
            shutdown,
        } = self;

        let mut pending: Option<RenderInput> = None;
        let mut closed = false;
        let mut last_fingerprint: Option<u64> = None;
        let mut generation = 0u64;

        loop {
            let mut next = match pending.take() {
                Some(input) => input,
                None if closed => return Ok(()),
                None => tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => return Ok(()),
                    r = requests.recv() => match r {
                        Some(input) => input,
                        None => return Ok(()),
                    },
                },
            };

            while !closed {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => return Ok(()),
                    r = tokio::time::timeout(debounce, requests.recv()) => match r {
                        Ok(Some(newer)) => {
                            tracing::debug!("request coalesced");
                            next = newer;
                        }
                        Ok(None) => closed = true,
                        Err(_) => break,
                    },
                }
            }

            let fingerprint = next.fingerprint();
            if last_fingerprint == Some(fingerprint) {
                tracing::debug!(fingerprint, "input unchanged, pass skipped");
                continue;
            }

            let cancel = shutdown.child_token();
            let outcome = if closed {
                LoadOutcome::Loaded(loader.load_cancellable(&next, &cancel).await)
            } else {
                tokio::select! {
                    biased;
                    r = requests.recv() => match r {
                        Some(newer) => LoadOutcome::Superseded(newer),
                        None => LoadOutcome::Closed,
                    },
                    res = loader.load_cancellable(&next, &cancel) => LoadOutcome::Loaded(res),
                }
            };

            let resolved = match outcome {
                LoadOutcome::Loaded(Ok(resolved)) => resolved,
                LoadOutcome::Loaded(Err(e)) => {
                    if shutdown.is_cancelled() {
                        return Ok(());
                    }
                    tracing::debug!(error = %e, "pass abandoned");
                    continue;
                }
                LoadOutcome::Superseded(newer) => {
                    cancel.cancel();
                    tracing::debug!("pass superseded by newer request");
                    pending = Some(newer);
                    continue;
                }
                LoadOutcome::Closed => {
                    closed = true;
                    pending = Some(next);
                    continue;
                }
            };

            let pass = RenderPass {
                input: &next,
                assets: &resolved,
            };
            match compositor.compose(&pass) {
                Ok(frame) => {
                    generation += 1;
                    last_fingerprint = resolved.failures().is_empty().then_some(fingerprint);
                    commits.send_replace(Some(Committed {
                        generation,
                        fingerprint,
                        frame: Arc::new(frame),
                    }));
                    tracing::debug!(generation, fingerprint, "frame committed");
                }
                Err(e) => tracing::warn!(error = %e, "render pass failed"),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
