use std::fs;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crate::engine::llm_client::AdviceGenerator;
use crate::engine::protocol::{DecodedImage, EngineCommand, EngineResponse};
use crate::model::advice::{AdviceDispatcher, AdviceRequest};
use crate::model::catalog::Region;

/// Background worker. Every request runs on its own thread so slow
/// requests never hold up others.
pub struct Engine {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    generator: Arc<dyn AdviceGenerator>,
}

impl Engine {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        generator: Arc<dyn AdviceGenerator>,
    ) -> Self {
        Self { rx, tx, generator }
    }

    pub fn run(&mut self) {
        while let Ok(cmd) = self.rx.recv() {
            match cmd {
                EngineCommand::GenerateAdvice(request) => self.spawn_advice(request),
                EngineCommand::LoadMapImage { region, source } => {
                    self.spawn_image_load(region, source)
                }
                EngineCommand::Shutdown => break,
            }
        }
        log::debug!("Engine stopped");
    }

    fn spawn_advice(&self, request: AdviceRequest) {
        let generator = Arc::clone(&self.generator);
        let tx = self.tx.clone();

        thread::spawn(move || {
            let outcome = generator.generate(&request.prompt);
            let _ = tx.send(EngineResponse::AdviceReady {
                target: request.target,
                outcome,
            });
        });
    }

    fn spawn_image_load(&self, region: Region, source: String) {
        let tx = self.tx.clone();

        thread::spawn(move || {
            let image = load_image(&source).map_err(|e| {
                log::warn!("Map image for {region} from {source} failed: {e:#}");
                e.to_string()
            });
            let _ = tx.send(EngineResponse::MapImageLoaded {
                region,
                source,
                image,
            });
        });
    }
}

fn load_image(source: &str) -> anyhow::Result<DecodedImage> {
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        reqwest::blocking::get(source)?
            .error_for_status()?
            .bytes()?
            .to_vec()
    } else {
        fs::read(source)?
    };
    decode_image(&bytes)
}

pub fn decode_image(bytes: &[u8]) -> anyhow::Result<DecodedImage> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    let (w, h) = img.dimensions();
    Ok(DecodedImage {
        size: [w as usize, h as usize],
        rgba: img.into_raw(),
    })
}

/// UI-side end of the engine channels.
pub struct EngineHandle {
    cmd_tx: Sender<EngineCommand>,
    resp_rx: Receiver<EngineResponse>,
}

impl EngineHandle {
    pub fn spawn(generator: Arc<dyn AdviceGenerator>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();

        thread::spawn(move || {
            let mut engine = Engine::new(cmd_rx, resp_tx, generator);
            engine.run();
        });

        Self { cmd_tx, resp_rx }
    }

    pub fn send(&self, cmd: EngineCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            log::warn!("Engine is gone, command dropped");
        }
    }

    pub fn try_recv(&self) -> Option<EngineResponse> {
        self.resp_rx.try_recv().ok()
    }

    #[cfg(test)]
    pub(crate) fn recv_timeout(&self, timeout: std::time::Duration) -> Option<EngineResponse> {
        self.resp_rx.recv_timeout(timeout).ok()
    }
}

impl AdviceDispatcher for EngineHandle {
    fn dispatch(&self, request: AdviceRequest) {
        self.send(EngineCommand::GenerateAdvice(request));
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::llm_client::tests::ScriptedGenerator;
    use crate::model::advice::{AdviceError, AdvicePrompt, AdviceTarget};
    use std::io::Cursor;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    fn request(target: AdviceTarget) -> AdviceRequest {
        AdviceRequest {
            target,
            prompt: AdvicePrompt {
                prompt: "p".into(),
                system: "s".into(),
            },
        }
    }

    #[test]
    fn advice_result_comes_back_tagged_with_target() {
        let handle = EngineHandle::spawn(Arc::new(ScriptedGenerator::new(vec![Ok(
            "Take the cards.".into(),
        )])));

        handle.dispatch(request(AdviceTarget::Item("nov-3".into())));

        match handle.recv_timeout(WAIT) {
            Some(EngineResponse::AdviceReady { target, outcome }) => {
                assert_eq!(target, AdviceTarget::Item("nov-3".into()));
                assert_eq!(outcome, Ok("Take the cards.".into()));
            }
            _ => panic!("expected advice response"),
        }
    }

    #[test]
    fn concurrent_requests_all_complete() {
        let handle = EngineHandle::spawn(Arc::new(ScriptedGenerator::new(vec![Err(
            AdviceError::EmptyResponse,
        )])));

        handle.dispatch(request(AdviceTarget::Item("a".into())));
        handle.dispatch(request(AdviceTarget::Item("b".into())));
        handle.dispatch(request(AdviceTarget::Codex));

        let mut targets = Vec::new();
        for _ in 0..3 {
            match handle.recv_timeout(WAIT) {
                Some(EngineResponse::AdviceReady { target, outcome }) => {
                    assert_eq!(outcome, Err(AdviceError::EmptyResponse));
                    targets.push(target);
                }
                _ => panic!("expected advice response"),
            }
        }
        assert!(targets.contains(&AdviceTarget::Item("a".into())));
        assert!(targets.contains(&AdviceTarget::Item("b".into())));
        assert!(targets.contains(&AdviceTarget::Codex));
    }

    #[test]
    fn local_map_image_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("velen.png");
        let mut bytes = Cursor::new(Vec::new());
        image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]))
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        fs::write(&path, bytes.into_inner()).unwrap();

        let handle = EngineHandle::spawn(Arc::new(ScriptedGenerator::new(vec![Ok(
            String::new(),
        )])));
        handle.send(EngineCommand::LoadMapImage {
            region: Region::Velen,
            source: path.display().to_string(),
        });

        match handle.recv_timeout(WAIT) {
            Some(EngineResponse::MapImageLoaded { region, image, .. }) => {
                let image = image.unwrap();
                assert_eq!(region, Region::Velen);
                assert_eq!(image.size, [4, 2]);
                assert_eq!(&image.rgba[..4], &[10, 20, 30, 255]);
            }
            _ => panic!("expected image response"),
        }
    }

    #[test]
    fn unreadable_image_reports_error() {
        assert!(decode_image(b"definitely not a png").is_err());

        let handle = EngineHandle::spawn(Arc::new(ScriptedGenerator::new(vec![Ok(
            String::new(),
        )])));
        handle.send(EngineCommand::LoadMapImage {
            region: Region::Toussaint,
            source: "/nonexistent/toussaint.png".into(),
        });
        match handle.recv_timeout(WAIT) {
            Some(EngineResponse::MapImageLoaded { image, .. }) => assert!(image.is_err()),
            _ => panic!("expected image response"),
        }
    }
}
