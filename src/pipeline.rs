//! The acquisition loop.
//!
//! One cycle: read a frame, optionally undistort it, look for a linear
//! barcode, and only if none was read fall back to the rectangle/QR path.
//! Every decoded symbol is framed and written to the transport. Overlays are
//! drawn after all analysis so they never leak into a decoder's input.

use crate::config::{Config, QrSearch};
use crate::decoder::{BarcodeDecoder, QrDecoder, SymbolDecoder};
use crate::detector::{GradientLocalizer, RectangleLocalizer};
use crate::device::{Display, FrameSource, NullDisplay, Transport};
use crate::error::{PipelineError, SourceError};
use crate::models::{CandidateRegion, Color, DecodedSymbol, Frame, SymbolData};
use crate::overlay::{Label, draw_polyline, fill_circle};
use crate::protocol::{Command, Packet, Payload, encode};
use log::{debug, info, warn};
use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

const BOX_THICKNESS: u32 = 2;
const CORNER_RADIUS: i32 = 5;

/// Stage counters for one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleTelemetry {
    pub barcode_regions: usize,
    pub rectangle_regions: usize,
    pub decode_errors: usize,
    pub packets_sent: usize,
    pub transport_failures: usize,
}

/// What one processed frame produced
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub barcode_region: Option<CandidateRegion>,
    pub rectangle_region: Option<CandidateRegion>,
    /// Decoded symbols, corners in frame coordinates
    pub symbols: Vec<DecodedSymbol>,
    /// Frames handed to the transport, in send order
    pub packets: Vec<Packet>,
    pub labels: Vec<Label>,
    pub telemetry: CycleTelemetry,
}

/// Counters across the whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopStats {
    pub frames: usize,
    /// Cycles where the source had no frame
    pub skipped: usize,
    pub symbols: usize,
    pub packets_sent: usize,
    pub transport_failures: usize,
    pub elapsed: Duration,
}

impl LoopStats {
    pub fn fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.frames as f64 / secs
        }
    }

    fn absorb(&mut self, report: &CycleReport) {
        self.frames += 1;
        self.symbols += report.symbols.len();
        self.packets_sent += report.telemetry.packets_sent;
        self.transport_failures += report.telemetry.transport_failures;
    }
}

/// Owns every device handle for the lifetime of the loop
pub struct Pipeline {
    config: Config,
    gradient: GradientLocalizer,
    rectangle: RectangleLocalizer,
    source: Box<dyn FrameSource>,
    barcode: Box<dyn SymbolDecoder>,
    qr: Box<dyn SymbolDecoder>,
    transport: Box<dyn Transport>,
    display: Box<dyn Display>,
    stats: LoopStats,
}

impl Pipeline {
    /// Pipeline with the barcode and QR readers and no display
    pub fn new(config: Config, source: Box<dyn FrameSource>, transport: Box<dyn Transport>) -> Self {
        Self {
            gradient: GradientLocalizer::new(config.gradient.clone()),
            rectangle: RectangleLocalizer::new(config.rectangle.clone()),
            config,
            source,
            barcode: Box::new(BarcodeDecoder::new()),
            qr: Box::new(QrDecoder::new()),
            transport,
            display: Box::new(NullDisplay::default()),
            stats: LoopStats::default(),
        }
    }

    pub fn with_barcode_decoder(mut self, decoder: Box<dyn SymbolDecoder>) -> Self {
        self.barcode = decoder;
        self
    }

    pub fn with_qr_decoder(mut self, decoder: Box<dyn SymbolDecoder>) -> Self {
        self.qr = decoder;
        self
    }

    pub fn with_display(mut self, display: Box<dyn Display>) -> Self {
        self.display = display;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    /// Run until `stop` is set or the source is exhausted.
    ///
    /// Only a frame-source failure other than exhaustion is an error.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<LoopStats, PipelineError> {
        let start = Instant::now();
        while !stop.load(Ordering::Relaxed) {
            match self.run_cycle() {
                Ok(_) => {}
                Err(SourceError::Exhausted) => {
                    info!("frame source exhausted after {} frames", self.stats.frames);
                    break;
                }
                Err(e) => {
                    self.stats.elapsed = start.elapsed();
                    return Err(e.into());
                }
            }
        }
        self.stats.elapsed = start.elapsed();
        Ok(self.stats.clone())
    }

    /// Acquire and process one frame. `Ok(None)` when the source had none.
    pub fn run_cycle(&mut self) -> Result<Option<CycleReport>, SourceError> {
        let Some(frame) = self.source.read_frame()? else {
            self.stats.skipped += 1;
            return Ok(None);
        };
        let started = Instant::now();
        let report = self.process_frame(frame);
        self.stats.absorb(&report);
        debug!(
            "cycle {} done in {:.1} ms: {:?}",
            self.stats.frames,
            started.elapsed().as_secs_f64() * 1e3,
            report.telemetry
        );
        Ok(Some(report))
    }

    /// Analyse, transmit, annotate and display one frame
    pub fn process_frame(&mut self, frame: Frame) -> CycleReport {
        let mut frame = match &self.config.lens {
            Some(lens) => lens.apply(&frame),
            None => frame,
        };

        let mut report = CycleReport::default();
        self.barcode_pass(&frame, &mut report);
        if report.symbols.is_empty() {
            self.rectangle_pass(&frame, &mut report);
        }

        annotate(&mut frame, &report);
        if let Err(e) = self.display.show(&frame, &report.labels) {
            warn!("display failed: {e}");
        }
        report
    }

    fn barcode_pass(&mut self, frame: &Frame, report: &mut CycleReport) {
        let Some(region) = self.gradient.locate(frame) else {
            return;
        };
        report.telemetry.barcode_regions += 1;
        let rect = region.axis_rect;

        if let Some(roi) = frame.crop(&rect) {
            let symbols = decode_logged(self.barcode.as_mut(), &roi, &mut report.telemetry);
            for sym in symbols {
                let sym = sym.translated(rect.x as i32, rect.y as i32);
                report.labels.push(Label::above(
                    rect.x as i32,
                    rect.y as i32,
                    sym.caption(),
                    Color::RED,
                ));
                self.send(&sym, Command::BARCODE, report);
                report.symbols.push(sym);
            }
        } else {
            debug!("barcode region {:?} is empty after clipping", rect);
        }
        report.barcode_region = Some(region);
    }

    fn rectangle_pass(&mut self, frame: &Frame, report: &mut CycleReport) {
        let region = self.rectangle.locate(frame);
        if region.is_some() {
            report.telemetry.rectangle_regions += 1;
        }

        let (input, dx, dy) = match (self.config.qr_search, &region) {
            (QrSearch::FullFrame, _) => (Some(Cow::Borrowed(frame)), 0, 0),
            (QrSearch::Roi, Some(r)) => (
                frame.crop(&r.axis_rect).map(Cow::Owned),
                r.axis_rect.x as i32,
                r.axis_rect.y as i32,
            ),
            (QrSearch::Roi, None) => (None, 0, 0),
        };

        if let Some(input) = input {
            let symbols = decode_logged(self.qr.as_mut(), &input, &mut report.telemetry);
            for sym in symbols {
                let sym = sym.translated(dx, dy);
                let (left, top) = label_anchor(&sym, region.as_ref());
                report
                    .labels
                    .push(Label::above(left, top, sym.caption(), Color::RED));
                self.send(&sym, Command::MARKER, report);
                report.symbols.push(sym);
            }
        }
        report.rectangle_region = region;
    }

    /// Frame and write one symbol; failures are logged and counted
    fn send(&mut self, sym: &DecodedSymbol, cmd: Command, report: &mut CycleReport) {
        let payload = match &sym.data {
            SymbolData::Text(t) => Payload::Text(t.clone()),
            SymbolData::Bytes(b) => Payload::Bytes(b.clone()),
        };
        let packet = encode(payload, cmd, self.config.serial.frame_format);
        match self.transport.write(packet.as_bytes()) {
            Ok(()) => {
                info!("sent {} [{}] for {}", cmd, packet, sym.caption());
                report.telemetry.packets_sent += 1;
            }
            Err(e) => {
                warn!("transport write failed, dropping packet: {e}");
                report.telemetry.transport_failures += 1;
            }
        }
        report.packets.push(packet);
    }
}

fn decode_logged(
    decoder: &mut dyn SymbolDecoder,
    input: &Frame,
    telemetry: &mut CycleTelemetry,
) -> Vec<DecodedSymbol> {
    match decoder.decode(input) {
        Ok(symbols) => symbols,
        Err(e) => {
            warn!("{} decoder failed: {e}", decoder.name());
            telemetry.decode_errors += 1;
            Vec::new()
        }
    }
}

/// Top-left of the symbol outline, else of the rectangle, else the origin
fn label_anchor(sym: &DecodedSymbol, region: Option<&CandidateRegion>) -> (i32, i32) {
    if let Some(corners) = &sym.corners {
        let left = corners.iter().map(|c| c.x).min().unwrap_or(0);
        let top = corners.iter().map(|c| c.y).min().unwrap_or(0);
        return (left, top);
    }
    region.map_or((0, 0), |r| (r.axis_rect.x as i32, r.axis_rect.y as i32))
}

fn annotate(frame: &mut Frame, report: &CycleReport) {
    if let Some(region) = &report.barcode_region {
        draw_polyline(frame, &region.corners, true, Color::GREEN, BOX_THICKNESS);
    }
    if let Some(region) = &report.rectangle_region {
        draw_polyline(frame, &region.corners, true, Color::GREEN, BOX_THICKNESS);
        for corner in &region.corners {
            fill_circle(frame, *corner, CORNER_RADIUS, Color::RED);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PointI, SymbolKind};

    #[test]
    fn test_label_anchor_prefers_symbol_corners() {
        let sym = DecodedSymbol::new(SymbolKind::Qr, SymbolData::Text("a".into())).with_corners([
            PointI::new(30, 40),
            PointI::new(60, 41),
            PointI::new(59, 70),
            PointI::new(31, 69),
        ]);
        assert_eq!(label_anchor(&sym, None), (30, 40));

        let bare = DecodedSymbol::new(SymbolKind::Qr, SymbolData::Text("a".into()));
        let region = CandidateRegion::new(
            [
                PointI::new(5, 6),
                PointI::new(50, 6),
                PointI::new(50, 60),
                PointI::new(5, 60),
            ],
            2430.0,
            198.0,
            100,
            100,
        );
        assert_eq!(label_anchor(&bare, Some(&region)), (5, 6));
        assert_eq!(label_anchor(&bare, None), (0, 0));
    }

    #[test]
    fn test_fps() {
        let stats = LoopStats {
            frames: 30,
            elapsed: Duration::from_secs(2),
            ..Default::default()
        };
        assert!((stats.fps() - 15.0).abs() < 1e-9);
        assert_eq!(LoopStats::default().fps(), 0.0);
    }
}
