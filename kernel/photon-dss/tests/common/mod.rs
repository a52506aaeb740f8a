//! Recording hardware layer and callback capture shared by the tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use photon_driver_api::AppToken;
use photon_driver_api::standard::{ModeInfo, Standard};
use photon_dss::irq::DispcIrq;
use photon_dss::request::{
    AdvancedTiming, ClockDivisors, OutputSignal, OverlayParams, PipelineParams, SdVencMode,
};
use photon_dss::{
    DisplayController, DisplayHal, DssConfig, DssInitParams, Edge, EventReason, NodeId, OutputInfo,
    VideoInterface,
};

/// One call into the hardware layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HalCall {
    Timing(NodeId, ModeInfo),
    Signal(NodeId, VideoInterface),
    Divisors(NodeId, ClockDivisors),
    AdvancedTiming(NodeId),
    EnableOutput(NodeId, bool),
    IrqEnable(DispcIrq, bool),
    Go(NodeId),
    ClearStatus(u32),
    Overlay(NodeId),
    PipeParams(NodeId),
    LineInterrupt(NodeId, u32),
    WbSource(NodeId),
    WbRegion(bool),
    SdVencConfigure(Standard),
    SdVencEnable(bool),
}

/// Hardware layer that records every call and serves a scripted status
/// word.
#[derive(Default)]
pub struct MockHal {
    status: AtomicU32,
    enabled: AtomicU32,
    line: AtomicU32,
    calls: Mutex<Vec<HalCall>>,
}

impl MockHal {
    fn record(&self, call: HalCall) {
        self.calls.lock().unwrap().push(call);
    }

    /// Sets the status word the next `read_status` returns.
    pub fn raise(&self, bits: u32) {
        self.status.fetch_or(bits, Ordering::SeqCst);
    }

    pub fn pending(&self) -> u32 {
        self.status.load(Ordering::SeqCst)
    }

    pub fn enabled(&self) -> DispcIrq {
        DispcIrq::from_bits_retain(self.enabled.load(Ordering::SeqCst))
    }

    pub fn set_line(&self, line: u32) {
        self.line.store(line, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<HalCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn take_calls(&self) -> Vec<HalCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

impl DisplayHal for MockHal {
    fn set_timing(&self, output: NodeId, timing: &ModeInfo) {
        self.record(HalCall::Timing(output, *timing));
    }

    fn set_signal(&self, signal: &OutputSignal) {
        self.record(HalCall::Signal(signal.output, signal.interface));
    }

    fn set_divisors(&self, output: NodeId, divisors: ClockDivisors) {
        self.record(HalCall::Divisors(output, divisors));
    }

    fn set_advanced_timing(&self, timing: &AdvancedTiming) {
        self.record(HalCall::AdvancedTiming(timing.output));
    }

    fn enable_output(&self, output: NodeId, enable: bool) {
        self.record(HalCall::EnableOutput(output, enable));
    }

    fn set_irq_enable(&self, mask: DispcIrq, enable: bool) {
        if enable {
            self.enabled.fetch_or(mask.bits(), Ordering::SeqCst);
        } else {
            self.enabled.fetch_and(!mask.bits(), Ordering::SeqCst);
        }
        self.record(HalCall::IrqEnable(mask, enable));
    }

    fn set_go(&self, node: NodeId) {
        self.record(HalCall::Go(node));
    }

    fn read_status(&self) -> u32 {
        self.status.load(Ordering::SeqCst)
    }

    fn clear_status(&self, status: u32) {
        self.status.fetch_and(!status, Ordering::SeqCst);
        self.record(HalCall::ClearStatus(status));
    }

    fn set_overlay(&self, params: &OverlayParams) {
        self.record(HalCall::Overlay(params.blender));
    }

    fn set_pipe_params(&self, params: &PipelineParams) {
        self.record(HalCall::PipeParams(params.pipe));
    }

    fn current_line(&self, _output: NodeId) -> u32 {
        self.line.load(Ordering::SeqCst)
    }

    fn set_line_interrupt(&self, output: NodeId, line: u32) {
        self.record(HalCall::LineInterrupt(output, line));
    }

    fn set_wb_source(&self, output: NodeId) {
        self.record(HalCall::WbSource(output));
    }

    fn set_wb_region_mode(&self, region: bool) {
        self.record(HalCall::WbRegion(region));
    }

    fn sdvenc_configure(&self, mode: &SdVencMode) {
        self.record(HalCall::SdVencConfigure(mode.standard));
    }

    fn sdvenc_enable(&self, enable: bool) {
        self.record(HalCall::SdVencEnable(enable));
    }
}

thread_local! {
    static FIRED: RefCell<Vec<(NodeId, EventReason, usize)>> = const { RefCell::new(Vec::new()) };
}

/// Pipe callback recording into a per-thread log.
pub fn record_event(pipe: NodeId, reason: EventReason, arg: AppToken) {
    FIRED.with(|f| f.borrow_mut().push((pipe, reason, arg.get())));
}

/// Drains the callbacks fired on this thread.
pub fn take_events() -> Vec<(NodeId, EventReason, usize)> {
    FIRED.with(|f| std::mem::take(&mut *f.borrow_mut()))
}

pub fn controller() -> DisplayController<MockHal> {
    controller_with(DssInitParams::default())
}

pub fn controller_with(params: DssInitParams) -> DisplayController<MockHal> {
    take_events();
    DisplayController::new(MockHal::default(), params)
}

/// Vid1 and Gfx1 on LCD1 -> DPI1 (720p), Vid2 on TV -> HDMI (1080i).
pub fn two_output_config() -> DssConfig {
    use NodeId::*;
    DssConfig::new(
        &[
            Edge::new(DssIn, Vid1),
            Edge::new(DssIn, Gfx1),
            Edge::new(DssIn, Vid2),
            Edge::new(Vid1, Lcd1),
            Edge::new(Gfx1, Lcd1),
            Edge::new(Lcd1, Dpi1),
            Edge::new(Vid2, Tv),
            Edge::new(Tv, Hdmi),
        ],
        &[
            OutputInfo::standard(Dpi1, Standard::P720_60, VideoInterface::Rgb24),
            OutputInfo::standard(Hdmi, Standard::I1080_60, VideoInterface::Hdmi),
        ],
    )
    .unwrap()
}
