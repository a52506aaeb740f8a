//! The display controller: configuration, pipe lifecycle and the shared
//! interrupt handler.

use core::any::Any;
use core::sync::atomic::{AtomicBool, Ordering};

use photon_core::arena::SlotArena;
use photon_core::sync::IrqSpinLock;
use photon_core::{kdebug, kinfo, ktrace_subsys, kwarn};
use photon_driver_api::frame::Fid;
use photon_driver_api::standard::{ModeInfo, ScanFormat};
use photon_driver_api::{
    CallbackRelay, DriverError, DriverHandle, DriverId, DriverInfo, DriverKind, InstanceId,
    VideoDriver,
};
use planck_noalloc::vec::ArrayVec;

use crate::config::{MAX_CLIENT_PIPES, MAX_OUTPUTS};
use crate::events::{CallbackDelivery, EventQueue, EventReason, PipeEvent};
use crate::graph::Graph;
use crate::hal::DisplayHal;
use crate::irq::{DispcIrq, WB_EVENTS, blender_irq};
use crate::node::{NodeId, NodeKind};
use crate::output::{OutputPathInfo, OutputState, PathInfo, resolve_timing};
use crate::pipe::{ClientInfo, ClientMode, PipeEntry, PipeHandle, PipeState, WbState};
use crate::request::{DSS_REQUEST, DssConfig, DssRequest, OutputSignal};
use crate::stats::ErrorStats;

/// Runtime parameters of a [`DisplayController`].
#[derive(Debug, Clone, Copy)]
pub struct DssInitParams {
    /// Id the controller registers under.
    pub driver_id: DriverId,
    /// Where pipe callbacks run.
    pub delivery: CallbackDelivery,
    /// Horizontal shift applied to pipes feeding an embedded-sync output.
    pub embedded_sync_shift: u32,
    /// Lines before the end of the active area at which an output stops
    /// being safe to push.
    pub line_margin: u32,
}

impl Default for DssInitParams {
    fn default() -> Self {
        Self {
            driver_id: DriverId::new(0x0d55),
            delivery: CallbackDelivery::Inline,
            embedded_sync_shift: 0,
            line_margin: 16,
        }
    }
}

struct DssState {
    graph: Graph,
    configured: bool,
    pipes: SlotArena<PipeEntry, MAX_CLIENT_PIPES>,
    outputs: ArrayVec<OutputState, MAX_OUTPUTS>,
    stats: ErrorStats,
}

impl DssState {
    const fn new() -> Self {
        Self {
            graph: Graph::new(),
            configured: false,
            pipes: SlotArena::new(),
            outputs: ArrayVec::new(),
            stats: ErrorStats::new(),
        }
    }

    fn any_running(&self) -> bool {
        self.pipes.iter().any(|(_, p)| p.is_running())
    }

    fn pipe_running(&self, node: NodeId) -> bool {
        self.pipes.iter().any(|(_, p)| p.node == node && p.is_running())
    }

    fn pipe_mut(&mut self, handle: PipeHandle) -> Result<&mut PipeEntry, DriverError> {
        self.pipes.get_mut(handle.key()).ok_or(DriverError::BadArgs)
    }

    fn output(&self, node: NodeId) -> Option<&OutputState> {
        self.outputs.iter().find(|o| o.node == node)
    }

    fn output_mut(&mut self, node: NodeId) -> Option<&mut OutputState> {
        self.outputs.iter_mut().find(|o| o.node == node)
    }
}

/// Interrupt bits a running pipe needs enabled.
fn irq_mask(pipe: &PipeEntry) -> DispcIrq {
    let blender = pipe.blender.and_then(blender_irq);
    match pipe.node.kind() {
        NodeKind::WriteBack => WB_EVENTS | blender.map_or(DispcIrq::empty(), |irq| irq.vsync),
        _ => blender.map_or(DispcIrq::empty(), |irq| irq.frame | irq.line),
    }
}

/// Advances the write-back field tracker and decides whether this
/// interrupt completes a capture.
///
/// The sync bit is judged against the field recorded by the previous
/// interrupt; only then is the field updated from this one.
fn writeback_event<H: DisplayHal>(
    hal: &H,
    pipe: &mut PipeEntry,
    source: Option<&OutputState>,
    status: DispcIrq,
) -> Option<EventReason> {
    let interlaced = pipe.mode() != ClientMode::MemToMem
        && source.is_some_and(|o| o.timing.scan_format == ScanFormat::Interlaced);

    let mut event = None;
    if status.contains(DispcIrq::WB_SYNC) {
        if !interlaced || pipe.wb.current_field == Fid::Bottom {
            event = Some(EventReason::WbCapture);
        }
        if status.contains(DispcIrq::WB_REGION_END) {
            pipe.wb.region_mode = !pipe.wb.region_mode;
            hal.set_wb_region_mode(pipe.wb.region_mode);
        }
    }

    if interlaced {
        if status.contains(DispcIrq::EVSYNC_ODD) {
            pipe.wb.current_field = Fid::Top;
        } else if status.contains(DispcIrq::EVSYNC_EVEN) {
            pipe.wb.current_field = Fid::Bottom;
        } else if pipe
            .blender
            .and_then(blender_irq)
            .is_some_and(|irq| status.intersects(irq.vsync))
        {
            pipe.wb.current_field = match pipe.wb.current_field {
                Fid::Top => Fid::Bottom,
                Fid::Bottom | Fid::Frame => Fid::Top,
            };
        }
    }
    event
}

/// Display subsystem controller.
///
/// Owns the routing graph, the pipe and output tables and the error
/// counters. Configuration calls and the interrupt handler share one
/// interrupt-masking spin lock; callbacks always run with it released.
/// `set_config` and `clear_config` additionally refuse to run while any
/// pipe is `Running`.
pub struct DisplayController<H> {
    hal: H,
    params: DssInitParams,
    state: IrqSpinLock<DssState>,
    events: IrqSpinLock<EventQueue>,
    opened: AtomicBool,
}

impl<H: DisplayHal> DisplayController<H> {
    /// Creates a controller with no configuration.
    pub fn new(hal: H, params: DssInitParams) -> Self {
        Self {
            hal,
            params,
            state: IrqSpinLock::new(DssState::new()),
            events: IrqSpinLock::new(EventQueue::new()),
            opened: AtomicBool::new(false),
        }
    }

    /// The hardware layer.
    pub fn hal(&self) -> &H {
        &self.hal
    }

    /// Runtime parameters.
    pub fn params(&self) -> &DssInitParams {
        &self.params
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Stores `config`, discovers its pipes and programs and enables every
    /// output it names.
    ///
    /// Nothing is stored or programmed unless the whole configuration is
    /// valid.
    ///
    /// # Errors
    ///
    /// - [`DriverError::DeviceInUse`] if a configuration is already stored
    ///   or a pipe is running.
    /// - [`DriverError::InvalidParams`] for a malformed edge, an output
    ///   entry that is not an output node or repeats one, or an unknown
    ///   standard.
    /// - [`DriverError::OutOfRange`] for oversized tables.
    pub fn set_config(&self, config: &DssConfig) -> Result<(), DriverError> {
        let graph = Graph::build(config.edges.as_slice())?;
        let mut outputs: ArrayVec<OutputState, MAX_OUTPUTS> = ArrayVec::new();
        for info in config.outputs.iter() {
            if info.output.kind() != NodeKind::Output || outputs.iter().any(|o| o.node == info.output)
            {
                kwarn!("dss: rejected output entry for {}", info.output);
                return Err(DriverError::InvalidParams);
            }
            let timing = resolve_timing(info)?;
            let blender = graph.blender_driving(info.output);
            outputs
                .try_push(OutputState::new(*info, timing, blender))
                .map_err(|_| DriverError::OutOfRange)?;
        }

        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.configured || state.any_running() {
            kwarn!("dss: set-config while configured or running");
            return Err(DriverError::DeviceInUse);
        }

        for (pipe, blender) in graph.pipes() {
            if state.pipes.find(|p| p.node == pipe).is_some() {
                continue;
            }
            let output = graph.output_of(blender);
            let mut entry = PipeEntry::new(pipe, Some(blender), output);
            if output
                .and_then(|o| outputs.iter().find(|s| s.node == o))
                .is_some_and(|s| s.config.interface.embedded_sync())
            {
                entry.position_shift = self.params.embedded_sync_shift;
            }
            state
                .pipes
                .insert(entry)
                .map_err(|_| DriverError::OutOfResources)?;
            kdebug!("dss: discovered pipe {} -> {}", pipe, blender);
        }

        let mut started: ArrayVec<(NodeId, ModeInfo), MAX_OUTPUTS> = ArrayVec::new();
        for out in outputs.iter_mut() {
            let info = &out.config;
            self.hal.set_timing(out.node, &out.timing);
            self.hal.set_signal(&OutputSignal {
                output: out.node,
                interface: info.interface,
                data_format: info.data_format,
                polarity: info.polarity,
            });
            self.hal.set_divisors(out.node, info.divisors);
            self.hal.set_line_interrupt(
                out.node,
                out.timing.height.saturating_sub(self.params.line_margin),
            );
            self.hal.enable_output(out.node, true);
            out.running = true;
            // Same capacity as `outputs`.
            let _ = started.try_push((out.node, out.timing));
        }

        state.graph = graph;
        state.outputs = outputs;
        state.configured = true;
        drop(guard);

        for (node, timing) in started.iter() {
            kinfo!(
                "dss: output {} running {} {}x{}",
                node,
                timing.standard,
                timing.width,
                timing.height
            );
        }
        Ok(())
    }

    /// Disables every running output and drops the graph, pipe and output
    /// tables. Pipe handles issued before the call become stale.
    ///
    /// # Errors
    ///
    /// [`DriverError::DeviceInUse`] while any pipe is running.
    pub fn clear_config(&self) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if state.any_running() {
            kwarn!("dss: clear-config while a pipe is running");
            return Err(DriverError::DeviceInUse);
        }
        for out in state.outputs.iter_mut().filter(|o| o.running) {
            self.hal.enable_output(out.node, false);
            out.running = false;
        }
        state.outputs.clear();
        state.pipes.clear();
        state.graph = Graph::new();
        state.configured = false;
        self.events.lock().clear();
        drop(state);

        kinfo!("dss: configuration cleared");
        Ok(())
    }

    /// Returns `true` while a configuration is stored.
    pub fn is_configured(&self) -> bool {
        self.state.lock().configured
    }

    // -----------------------------------------------------------------------
    // Pipe lifecycle
    // -----------------------------------------------------------------------

    /// Binds `client` to the pipe on `node`.
    ///
    /// Pipes come from the stored configuration, except the write-back
    /// pipe, whose entry is created on its first open and reused after.
    ///
    /// # Errors
    ///
    /// - [`DriverError::Fail`] if `node` is not a configured pipe.
    /// - [`DriverError::DeviceInUse`] if the pipe is running.
    /// - [`DriverError::OutOfResources`] if the pipe table is full.
    pub fn open_pipe(&self, node: NodeId, client: ClientInfo) -> Result<PipeHandle, DriverError> {
        let mut state = self.state.lock();
        let key = match state.pipes.find(|p| p.node == node) {
            Some(key) => key,
            None if node == NodeId::Wb => state
                .pipes
                .insert(PipeEntry::new(NodeId::Wb, None, None))
                .map_err(|_| DriverError::OutOfResources)?,
            None => {
                kwarn!("dss: open of unconfigured pipe {}", node);
                return Err(DriverError::Fail);
            }
        };
        let entry = state.pipes.get_mut(key).ok_or(DriverError::Fail)?;
        if entry.state == PipeState::Running {
            return Err(DriverError::DeviceInUse);
        }
        entry.client = Some(client);
        entry.state = PipeState::Opened;
        kdebug!("dss: pipe {} opened", node);
        Ok(PipeHandle::from_key(key))
    }

    /// Replaces the client bound to an opened pipe.
    ///
    /// # Errors
    ///
    /// - [`DriverError::BadArgs`] for a stale handle.
    /// - [`DriverError::Fail`] if the pipe is not opened.
    /// - [`DriverError::DeviceInUse`] if it is running.
    pub fn register_client(&self, handle: PipeHandle, client: ClientInfo) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        let entry = state.pipe_mut(handle)?;
        match entry.state {
            PipeState::Idle => Err(DriverError::Fail),
            PipeState::Running => Err(DriverError::DeviceInUse),
            PipeState::Opened => {
                entry.client = Some(client);
                Ok(())
            }
        }
    }

    /// Unbinds the client and returns the pipe to `Idle`.
    ///
    /// # Errors
    ///
    /// - [`DriverError::BadArgs`] for a stale handle.
    /// - [`DriverError::DeviceInUse`] if the pipe is running.
    pub fn unregister_client(&self, handle: PipeHandle) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        let entry = state.pipe_mut(handle)?;
        if entry.state == PipeState::Running {
            return Err(DriverError::DeviceInUse);
        }
        entry.client = None;
        entry.state = PipeState::Idle;
        let node = entry.node;
        self.events.lock().purge(node);
        kdebug!("dss: pipe {} closed", node);
        Ok(())
    }

    /// Enables the pipe's interrupts, sets the go bit and moves the pipe
    /// to `Running`.
    ///
    /// # Errors
    ///
    /// - [`DriverError::BadArgs`] for a stale handle.
    /// - [`DriverError::Fail`] if the pipe is not opened, or is a capture
    ///   write-back pipe with no source.
    pub fn start_client(&self, handle: PipeHandle) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        let entry = state.pipe_mut(handle)?;
        if entry.state != PipeState::Opened {
            kwarn!("dss: start of {} in state {:?}", entry.node, entry.state);
            return Err(DriverError::Fail);
        }
        let go_node = match entry.node.kind() {
            NodeKind::WriteBack => {
                if entry.mode() != ClientMode::MemToMem && entry.output.is_none() {
                    kwarn!("dss: write-back started without a source");
                    return Err(DriverError::Fail);
                }
                NodeId::Wb
            }
            _ => entry.blender.ok_or(DriverError::Fail)?,
        };
        entry.state = PipeState::Running;
        self.hal.set_irq_enable(irq_mask(entry), true);
        self.hal.set_go(go_node);
        kdebug!("dss: pipe {} running", entry.node);
        Ok(())
    }

    /// Moves the pipe back to `Opened`.
    ///
    /// Interrupt bits are disabled only if no other running pipe still
    /// needs them, so stopping one of two pipes on a blender leaves that
    /// blender's interrupt enabled.
    ///
    /// # Errors
    ///
    /// - [`DriverError::BadArgs`] for a stale handle.
    /// - [`DriverError::Fail`] if the pipe is not running.
    pub fn stop_client(&self, handle: PipeHandle) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        let entry = state.pipe_mut(handle)?;
        if entry.state != PipeState::Running {
            kwarn!("dss: stop of {} in state {:?}", entry.node, entry.state);
            return Err(DriverError::Fail);
        }
        entry.state = PipeState::Opened;
        let node = entry.node;
        let mask = irq_mask(entry);

        let still_needed = state
            .pipes
            .iter()
            .filter(|(_, p)| p.is_running())
            .fold(DispcIrq::empty(), |acc, (_, p)| acc | irq_mask(p));
        let release = mask.difference(still_needed);
        if !release.is_empty() {
            self.hal.set_irq_enable(release, false);
        }
        let purged = self.events.lock().purge(node);
        kdebug!("dss: pipe {} stopped, {} queued events dropped", node, purged);
        Ok(())
    }

    /// Binds the write-back pipe to the output it captures.
    ///
    /// # Errors
    ///
    /// - [`DriverError::BadArgs`] for a stale handle.
    /// - [`DriverError::InvalidParams`] if `handle` is not the write-back
    ///   pipe or `source` is not an output.
    /// - [`DriverError::DeviceInUse`] while the pipe is running.
    /// - [`DriverError::Fail`] if no configured blender drives `source`.
    pub fn configure_writeback(&self, handle: PipeHandle, source: NodeId) -> Result<(), DriverError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let blender = state.graph.blender_driving(source);
        let entry = state.pipes.get_mut(handle.key()).ok_or(DriverError::BadArgs)?;
        if entry.node != NodeId::Wb || source.kind() != NodeKind::Output {
            return Err(DriverError::InvalidParams);
        }
        if entry.state == PipeState::Running {
            return Err(DriverError::DeviceInUse);
        }
        let Some(blender) = blender else {
            kwarn!("dss: write-back source {} is not configured", source);
            return Err(DriverError::Fail);
        };
        entry.blender = Some(blender);
        entry.output = Some(source);
        entry.wb = WbState::default();
        self.hal.set_wb_source(source);
        kdebug!("dss: write-back captures {} via {}", source, blender);
        Ok(())
    }

    /// Lifecycle state of a pipe, `None` for a stale handle.
    pub fn pipe_state(&self, handle: PipeHandle) -> Option<PipeState> {
        self.state.lock().pipes.get(handle.key()).map(|p| p.state)
    }

    /// Number of entries in the pipe table.
    pub fn pipe_count(&self) -> usize {
        self.state.lock().pipes.len()
    }

    // -----------------------------------------------------------------------
    // Path queries
    // -----------------------------------------------------------------------

    /// Geometry of the output a pipe feeds, plus its position shift.
    ///
    /// # Errors
    ///
    /// - [`DriverError::BadArgs`] for a stale handle.
    /// - [`DriverError::Fail`] if the pipe has no configured output.
    pub fn get_path_info(&self, handle: PipeHandle) -> Result<PathInfo, DriverError> {
        let state = self.state.lock();
        let entry = state.pipes.get(handle.key()).ok_or(DriverError::BadArgs)?;
        let output = entry.output.ok_or(DriverError::Fail)?;
        let out = state.output(output).ok_or(DriverError::Fail)?;
        Ok(PathInfo {
            output,
            info: out.path_info(),
            position_shift: entry.position_shift,
        })
    }

    /// Geometry of a configured output.
    pub fn output_path_info(&self, output: NodeId) -> Option<OutputPathInfo> {
        self.state.lock().output(output).map(OutputState::path_info)
    }

    /// Returns `true` if `output` is configured and enabled.
    pub fn output_running(&self, output: NodeId) -> bool {
        self.state.lock().output(output).is_some_and(|o| o.running)
    }

    /// Whether a new frame address can be programmed on `output` without
    /// tearing. `false` for unconfigured outputs.
    pub fn is_safe_to_push(&self, output: NodeId) -> bool {
        self.state
            .lock()
            .output(output)
            .is_some_and(|o| o.running && o.safe_to_push)
    }

    /// Line the timing generator of `output` is scanning.
    ///
    /// # Errors
    ///
    /// [`DriverError::Fail`] if `output` is not running.
    pub fn get_current_line(&self, output: NodeId) -> Result<u32, DriverError> {
        if !self.output_running(output) {
            return Err(DriverError::Fail);
        }
        Ok(self.hal.current_line(output))
    }

    // -----------------------------------------------------------------------
    // Interrupt path
    // -----------------------------------------------------------------------

    /// Handles one display interrupt.
    ///
    /// Reads the status word once, updates the error counters and the
    /// safe-to-push flags, collects at most one event per running pipe,
    /// delivers or queues the events and finally clears the status word
    /// it read. Bits nothing is waiting for are ignored.
    pub fn isr(&self) {
        let raw = self.hal.read_status();
        let status = DispcIrq::from_bits_truncate(raw);
        ktrace_subsys!(irq, "dss status {:#010x}", raw);

        let mut fired: ArrayVec<PipeEvent, MAX_CLIENT_PIPES> = ArrayVec::new();
        {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            state.stats.accumulate(status);

            for out in state.outputs.iter_mut() {
                let Some(irq) = out.blender.and_then(blender_irq) else {
                    continue;
                };
                if status.intersects(irq.frame) {
                    out.safe_to_push = true;
                }
                if status.intersects(irq.line) {
                    out.safe_to_push = false;
                }
            }

            let outputs = &state.outputs;
            for (_, pipe) in state.pipes.iter_mut() {
                if !pipe.is_running() {
                    continue;
                }
                let reason = if pipe.node.kind() == NodeKind::WriteBack {
                    let source = pipe
                        .output
                        .and_then(|o| outputs.iter().find(|s| s.node == o));
                    writeback_event(&self.hal, pipe, source, status)
                } else {
                    pipe.blender
                        .and_then(blender_irq)
                        .filter(|irq| status.intersects(irq.frame))
                        .map(|_| EventReason::FrameDone)
                };
                let (Some(reason), Some(client)) = (reason, pipe.client) else {
                    continue;
                };
                if let Some(callback) = client.callback {
                    let event = PipeEvent {
                        pipe: pipe.node,
                        reason,
                        callback,
                        arg: client.arg,
                    };
                    if fired.try_push(event).is_err() {
                        ktrace_subsys!(irq, "event table full, {} skipped", pipe.node);
                    }
                }
            }
        }

        for event in fired.iter() {
            match self.params.delivery {
                CallbackDelivery::Inline => event.deliver(),
                CallbackDelivery::Deferred => {
                    if !self.events.lock().post(*event) {
                        ktrace_subsys!(irq, "event queue full, {} dropped", event.pipe);
                    }
                }
            }
        }

        self.hal.clear_status(raw);
    }

    /// Delivers every queued event; returns how many ran.
    ///
    /// Called from the dispatch task in [`CallbackDelivery::Deferred`]
    /// mode. Events of a pipe that is no longer running are discarded.
    /// Neither lock is held while a callback runs.
    pub fn dispatch_pending(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.events.lock().pop();
            let Some(event) = next else {
                break;
            };
            if !self.state.lock().pipe_running(event.pipe) {
                kdebug!("dss: discarded event for stopped pipe {}", event.pipe);
                continue;
            }
            event.deliver();
            delivered += 1;
        }
        delivered
    }

    /// Events waiting for [`dispatch_pending`](Self::dispatch_pending).
    pub fn pending_events(&self) -> usize {
        self.events.lock().len()
    }

    /// Events lost because the deferred queue was full.
    pub fn dropped_events(&self) -> u32 {
        self.events.lock().dropped()
    }

    // -----------------------------------------------------------------------
    // Error statistics
    // -----------------------------------------------------------------------

    /// Snapshot of the error counters.
    pub fn error_stats(&self) -> ErrorStats {
        self.state.lock().stats
    }

    /// Clears the counters of one pipe.
    ///
    /// # Errors
    ///
    /// [`DriverError::InvalidParams`] if `pipe` is not a pipe node.
    pub fn reset_pipe_errors(&self, pipe: NodeId) -> Result<(), DriverError> {
        if !matches!(pipe.kind(), NodeKind::Pipe | NodeKind::WriteBack) {
            return Err(DriverError::InvalidParams);
        }
        self.state.lock().stats.reset_pipe(pipe);
        Ok(())
    }

    /// Clears every counter.
    pub fn reset_all_errors(&self) {
        self.state.lock().stats.reset_all();
    }

    // -----------------------------------------------------------------------
    // Typed requests
    // -----------------------------------------------------------------------

    /// Runs one control request.
    ///
    /// # Errors
    ///
    /// Whatever the underlying operation returns;
    /// [`DriverError::InvalidParams`] when a parameter block names a node of
    /// the wrong kind.
    pub fn handle_request(&self, request: &mut DssRequest) -> Result<(), DriverError> {
        kdebug!("dss: request {}", request.name());
        match request {
            DssRequest::SetConfig(config) => self.set_config(config),
            DssRequest::ClearConfig => self.clear_config(),
            DssRequest::SetOverlayParams(params) => {
                expect_kind(params.blender, NodeKind::Blender)?;
                self.hal.set_overlay(params);
                self.hal.set_go(params.blender);
                Ok(())
            }
            DssRequest::SetPipelineParams(params) => {
                expect_kind(params.pipe, NodeKind::Pipe)?;
                self.hal.set_pipe_params(params);
                Ok(())
            }
            DssRequest::SetOutputSignal(signal) => {
                expect_kind(signal.output, NodeKind::Output)?;
                if let Some(out) = self.state.lock().output_mut(signal.output) {
                    out.config.interface = signal.interface;
                    out.config.data_format = signal.data_format;
                    out.config.polarity = signal.polarity;
                }
                self.hal.set_signal(signal);
                Ok(())
            }
            DssRequest::SetPixelClockDivisors(params) => {
                expect_kind(params.output, NodeKind::Output)?;
                if let Some(out) = self.state.lock().output_mut(params.output) {
                    out.config.divisors = params.divisors;
                }
                self.hal.set_divisors(params.output, params.divisors);
                Ok(())
            }
            DssRequest::SetAdvancedTiming(timing) => {
                expect_kind(timing.output, NodeKind::Output)?;
                if let Some(out) = self.state.lock().output_mut(timing.output) {
                    out.timing = timing.timing;
                }
                self.hal.set_timing(timing.output, &timing.timing);
                self.hal.set_advanced_timing(timing);
                self.hal.set_line_interrupt(
                    timing.output,
                    timing.timing.height.saturating_sub(self.params.line_margin),
                );
                Ok(())
            }
            DssRequest::GetErrorStats(stats) => {
                *stats = self.error_stats();
                Ok(())
            }
            DssRequest::ResetPipeErrors(pipe) => self.reset_pipe_errors(*pipe),
            DssRequest::SetSdVencMode(mode) => {
                if !mode.standard.is_sd() {
                    return Err(DriverError::InvalidParams);
                }
                self.hal.sdvenc_configure(mode);
                Ok(())
            }
            DssRequest::EnableSdVenc(enable) => {
                self.hal.sdvenc_enable(*enable);
                Ok(())
            }
        }
    }
}

fn expect_kind(node: NodeId, kind: NodeKind) -> Result<(), DriverError> {
    if node.kind() == kind {
        Ok(())
    } else {
        Err(DriverError::InvalidParams)
    }
}

/// Handle value of the single controller instance.
const DSS_HANDLE: DriverHandle = DriverHandle::new(1);

impl<H: DisplayHal> VideoDriver for DisplayController<H> {
    fn info(&self) -> DriverInfo {
        DriverInfo {
            id: self.params.driver_id,
            name: "dss",
            kind: DriverKind::DisplayController,
            max_instances: 1,
        }
    }

    fn create(
        &self,
        instance: InstanceId,
        _args: Option<&dyn Any>,
        _status: Option<&mut dyn Any>,
        _relay: Option<CallbackRelay>,
    ) -> Result<DriverHandle, DriverError> {
        if instance.as_u32() != 0 {
            return Err(DriverError::NoDevice);
        }
        if self.opened.swap(true, Ordering::AcqRel) {
            return Err(DriverError::DeviceInUse);
        }
        Ok(DSS_HANDLE)
    }

    fn delete(&self, handle: DriverHandle, _args: Option<&dyn Any>) -> Result<(), DriverError> {
        if handle != DSS_HANDLE
            || self
                .opened
                .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            return Err(DriverError::BadArgs);
        }
        Ok(())
    }

    fn control(
        &self,
        handle: DriverHandle,
        cmd: u32,
        args: Option<&mut dyn Any>,
    ) -> Result<(), DriverError> {
        if handle != DSS_HANDLE {
            return Err(DriverError::BadArgs);
        }
        if cmd != DSS_REQUEST {
            return Err(DriverError::UnsupportedCommand);
        }
        let request = args
            .and_then(|a| a.downcast_mut::<DssRequest>())
            .ok_or(DriverError::BadArgs)?;
        self.handle_request(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{OutputInfo, VideoInterface};
    use photon_driver_api::standard::Standard;

    #[test]
    fn read_pipe_mask_covers_frame_and_line() {
        let entry = PipeEntry::new(NodeId::Vid1, Some(NodeId::Lcd1), Some(NodeId::Dpi1));
        assert_eq!(
            irq_mask(&entry),
            DispcIrq::FRAMEDONE1 | DispcIrq::VSYNC1 | DispcIrq::PROG_LINE1
        );
        let unbound = PipeEntry::new(NodeId::Vid2, None, None);
        assert!(irq_mask(&unbound).is_empty());
    }

    #[test]
    fn writeback_mask_includes_source_field_syncs() {
        let entry = PipeEntry::new(NodeId::Wb, Some(NodeId::Tv), Some(NodeId::Hdmi));
        let mask = irq_mask(&entry);
        assert!(mask.contains(WB_EVENTS));
        assert!(mask.contains(DispcIrq::EVSYNC_EVEN | DispcIrq::EVSYNC_ODD));
        assert!(!mask.contains(DispcIrq::FRAMEDONE_TV));
    }

    struct NullHal;

    impl DisplayHal for NullHal {
        fn set_timing(&self, _: NodeId, _: &photon_driver_api::standard::ModeInfo) {}
        fn set_signal(&self, _: &OutputSignal) {}
        fn set_divisors(&self, _: NodeId, _: crate::request::ClockDivisors) {}
        fn set_advanced_timing(&self, _: &crate::request::AdvancedTiming) {}
        fn enable_output(&self, _: NodeId, _: bool) {}
        fn set_irq_enable(&self, _: DispcIrq, _: bool) {}
        fn set_go(&self, _: NodeId) {}
        fn read_status(&self) -> u32 {
            0
        }
        fn clear_status(&self, _: u32) {}
        fn set_overlay(&self, _: &crate::request::OverlayParams) {}
        fn set_pipe_params(&self, _: &crate::request::PipelineParams) {}
        fn current_line(&self, _: NodeId) -> u32 {
            0
        }
        fn set_line_interrupt(&self, _: NodeId, _: u32) {}
        fn set_wb_source(&self, _: NodeId) {}
        fn set_wb_region_mode(&self, _: bool) {}
        fn sdvenc_configure(&self, _: &crate::request::SdVencMode) {}
        fn sdvenc_enable(&self, _: bool) {}
    }

    #[test]
    fn delete_releases_the_instance_exactly_once() {
        let dss = DisplayController::new(NullHal, DssInitParams::default());
        let handle = dss.create(InstanceId::new(0), None, None, None).unwrap();
        assert_eq!(dss.delete(handle, None), Ok(()));
        assert_eq!(dss.delete(handle, None), Err(DriverError::BadArgs));
        assert_eq!(dss.create(InstanceId::new(0), None, None, None), Ok(handle));
    }

    fn interlaced_source() -> OutputState {
        let info = OutputInfo::standard(NodeId::Hdmi, Standard::I1080_60, VideoInterface::Hdmi);
        OutputState::new(info, resolve_timing(&info).unwrap(), Some(NodeId::Tv))
    }

    fn running_wb(mode: ClientMode) -> PipeEntry {
        fn noop(_: NodeId, _: EventReason, _: photon_driver_api::AppToken) {}
        let mut entry = PipeEntry::new(NodeId::Wb, Some(NodeId::Tv), Some(NodeId::Hdmi));
        entry.client = Some(ClientInfo::with_mode(
            noop,
            photon_driver_api::AppToken::new(0),
            mode,
        ));
        entry.state = PipeState::Running;
        entry
    }

    #[test]
    fn interlaced_capture_fires_after_bottom_field() {
        let source = interlaced_source();
        let mut wb = running_wb(ClientMode::Capture);

        // Top field starts; sync for the previous (unknown) field is swallowed.
        let first = writeback_event(&NullHal, &mut wb, Some(&source), DispcIrq::WB_SYNC | DispcIrq::EVSYNC_ODD);
        assert_eq!(first, None);
        assert_eq!(wb.wb.current_field, Fid::Top);

        // Bottom field starts; the top field capture is not a full frame yet.
        let second = writeback_event(&NullHal, &mut wb, Some(&source), DispcIrq::WB_SYNC | DispcIrq::EVSYNC_EVEN);
        assert_eq!(second, None);
        assert_eq!(wb.wb.current_field, Fid::Bottom);

        // Sync after the bottom field completes the frame.
        let third = writeback_event(&NullHal, &mut wb, Some(&source), DispcIrq::WB_SYNC | DispcIrq::EVSYNC_ODD);
        assert_eq!(third, Some(EventReason::WbCapture));
    }

    #[test]
    fn mem_to_mem_fires_on_every_sync() {
        let source = interlaced_source();
        let mut wb = running_wb(ClientMode::MemToMem);
        for _ in 0..3 {
            assert_eq!(
                writeback_event(&NullHal, &mut wb, Some(&source), DispcIrq::WB_SYNC),
                Some(EventReason::WbCapture)
            );
        }
    }

    #[test]
    fn region_mode_toggles_only_with_sync() {
        let mut wb = running_wb(ClientMode::MemToMem);
        writeback_event(&NullHal, &mut wb, None, DispcIrq::WB_REGION_END);
        assert!(!wb.wb.region_mode);
        writeback_event(&NullHal, &mut wb, None, DispcIrq::WB_SYNC | DispcIrq::WB_REGION_END);
        assert!(wb.wb.region_mode);
        writeback_event(&NullHal, &mut wb, None, DispcIrq::WB_SYNC | DispcIrq::WB_REGION_END);
        assert!(!wb.wb.region_mode);
    }
}
