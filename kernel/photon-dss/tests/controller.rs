//! Configuration, pipe lifecycle and interrupt demultiplexing against a
//! recording hardware layer.

mod common;

use common::{HalCall, controller, controller_with, record_event, take_events, two_output_config};
use photon_driver_api::standard::{ScanFormat, Standard};
use photon_driver_api::{AppToken, DriverError};
use photon_dss::irq::DispcIrq;
use photon_dss::{
    CallbackDelivery, ClientInfo, ClientMode, DssConfig, DssInitParams, Edge, EventReason, NodeId,
    OutputInfo, PipeState, VideoInterface,
};

fn client(arg: usize) -> ClientInfo {
    ClientInfo::display(record_event, AppToken::new(arg))
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn set_config_programs_and_enables_outputs() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();

    assert!(dss.is_configured());
    assert_eq!(dss.pipe_count(), 3);
    assert!(dss.output_running(NodeId::Dpi1));
    assert!(dss.output_running(NodeId::Hdmi));
    assert!(!dss.output_running(NodeId::Dpi2));

    let calls = dss.hal().calls();
    assert!(calls.contains(&HalCall::EnableOutput(NodeId::Dpi1, true)));
    assert!(calls.contains(&HalCall::EnableOutput(NodeId::Hdmi, true)));
    assert!(calls.contains(&HalCall::LineInterrupt(NodeId::Dpi1, 720 - 16)));

    let hdmi = dss.output_path_info(NodeId::Hdmi).unwrap();
    assert_eq!(hdmi.scan_format, ScanFormat::Interlaced);
    assert_eq!((hdmi.width, hdmi.height), (1920, 1080));
    assert_eq!(hdmi.standard, Standard::I1080_60);
}

#[test]
fn set_config_then_clear_config_empties_tables() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();
    dss.hal().take_calls();

    dss.clear_config().unwrap();
    assert_eq!(dss.pipe_count(), 0);
    assert!(!dss.is_configured());
    assert!(!dss.output_running(NodeId::Dpi1));
    assert!(!dss.output_running(NodeId::Hdmi));
    let calls = dss.hal().calls();
    assert!(calls.contains(&HalCall::EnableOutput(NodeId::Dpi1, false)));
    assert!(calls.contains(&HalCall::EnableOutput(NodeId::Hdmi, false)));
}

#[test]
fn invalid_config_touches_nothing() {
    let dss = controller();
    let bad_edge = DssConfig::new(&[Edge::new(NodeId::Vid1, NodeId::Dpi1)], &[]).unwrap();
    assert_eq!(dss.set_config(&bad_edge), Err(DriverError::InvalidParams));

    let not_an_output = DssConfig::new(
        &[Edge::new(NodeId::Vid1, NodeId::Lcd1)],
        &[OutputInfo::standard(NodeId::Lcd1, Standard::P720_60, VideoInterface::Rgb24)],
    )
    .unwrap();
    assert_eq!(dss.set_config(&not_an_output), Err(DriverError::InvalidParams));

    let custom_without_timing = DssConfig::new(
        &[Edge::new(NodeId::Lcd1, NodeId::Dpi1)],
        &[OutputInfo::standard(NodeId::Dpi1, Standard::Custom, VideoInterface::Rgb24)],
    )
    .unwrap();
    assert_eq!(
        dss.set_config(&custom_without_timing),
        Err(DriverError::InvalidParams)
    );

    assert!(!dss.is_configured());
    assert_eq!(dss.pipe_count(), 0);
    assert!(dss.hal().calls().is_empty());
}

#[test]
fn reconfigure_requires_clear() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();
    assert_eq!(
        dss.set_config(&two_output_config()),
        Err(DriverError::DeviceInUse)
    );
    dss.clear_config().unwrap();
    dss.set_config(&two_output_config()).unwrap();
}

#[test]
fn configuration_is_locked_while_running() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();
    let vid1 = dss.open_pipe(NodeId::Vid1, client(1)).unwrap();
    dss.start_client(vid1).unwrap();

    assert_eq!(dss.clear_config(), Err(DriverError::DeviceInUse));
    assert!(dss.output_running(NodeId::Dpi1));

    dss.stop_client(vid1).unwrap();
    dss.clear_config().unwrap();
}

// ---------------------------------------------------------------------------
// Pipe lifecycle
// ---------------------------------------------------------------------------

#[test]
fn open_pipe_requires_discovered_node() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();
    assert_eq!(
        dss.open_pipe(NodeId::Vid3, client(0)).map(|_| ()),
        Err(DriverError::Fail)
    );
    let vid1 = dss.open_pipe(NodeId::Vid1, client(0)).unwrap();
    assert_eq!(dss.pipe_state(vid1), Some(PipeState::Opened));
}

#[test]
fn writeback_entry_is_created_once() {
    let dss = controller();
    let before = dss.pipe_count();
    let first = dss.open_pipe(NodeId::Wb, client(0)).unwrap();
    assert_eq!(dss.pipe_count(), before + 1);
    let second = dss.open_pipe(NodeId::Wb, client(1)).unwrap();
    assert_eq!(dss.pipe_count(), before + 1);
    assert_eq!(first, second);
}

#[test]
fn state_machine_rejects_skipped_transitions() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();
    let vid1 = dss.open_pipe(NodeId::Vid1, client(0)).unwrap();

    assert_eq!(dss.stop_client(vid1), Err(DriverError::Fail));
    dss.start_client(vid1).unwrap();
    assert_eq!(dss.pipe_state(vid1), Some(PipeState::Running));
    assert_eq!(dss.start_client(vid1), Err(DriverError::Fail));
    assert_eq!(dss.unregister_client(vid1), Err(DriverError::DeviceInUse));
    assert_eq!(
        dss.open_pipe(NodeId::Vid1, client(2)).map(|_| ()),
        Err(DriverError::DeviceInUse)
    );

    dss.stop_client(vid1).unwrap();
    dss.unregister_client(vid1).unwrap();
    assert_eq!(dss.pipe_state(vid1), Some(PipeState::Idle));
    assert_eq!(dss.start_client(vid1), Err(DriverError::Fail));
    assert_eq!(dss.register_client(vid1, client(3)), Err(DriverError::Fail));
}

#[test]
fn handles_go_stale_after_clear() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();
    let vid1 = dss.open_pipe(NodeId::Vid1, client(0)).unwrap();
    dss.clear_config().unwrap();
    dss.set_config(&two_output_config()).unwrap();

    assert_eq!(dss.pipe_state(vid1), None);
    assert_eq!(dss.start_client(vid1), Err(DriverError::BadArgs));
    assert_eq!(dss.get_path_info(vid1).map(|_| ()), Err(DriverError::BadArgs));
}

#[test]
fn start_arms_blender_interrupt_and_go() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();
    let vid1 = dss.open_pipe(NodeId::Vid1, client(0)).unwrap();
    dss.hal().take_calls();

    dss.start_client(vid1).unwrap();
    assert!(dss.hal().enabled().contains(DispcIrq::FRAMEDONE1 | DispcIrq::PROG_LINE1));
    assert!(dss.hal().calls().contains(&HalCall::Go(NodeId::Lcd1)));
}

#[test]
fn stopping_only_pipe_disables_blender_interrupt() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();
    let vid2 = dss.open_pipe(NodeId::Vid2, client(0)).unwrap();
    dss.start_client(vid2).unwrap();
    assert!(dss.hal().enabled().contains(DispcIrq::FRAMEDONE_TV));

    dss.stop_client(vid2).unwrap();
    assert!(!dss.hal().enabled().intersects(DispcIrq::FRAMEDONE_TV | DispcIrq::PROG_LINE_TV));
}

#[test]
fn shared_blender_stays_enabled_until_last_pipe_stops() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();
    let vid1 = dss.open_pipe(NodeId::Vid1, client(1)).unwrap();
    let gfx1 = dss.open_pipe(NodeId::Gfx1, client(2)).unwrap();
    dss.start_client(vid1).unwrap();
    dss.start_client(gfx1).unwrap();
    dss.hal().take_calls();

    dss.stop_client(vid1).unwrap();
    assert!(dss.hal().enabled().contains(DispcIrq::FRAMEDONE1));
    assert!(
        !dss.hal()
            .calls()
            .iter()
            .any(|c| matches!(c, HalCall::IrqEnable(_, false)))
    );

    dss.stop_client(gfx1).unwrap();
    assert!(!dss.hal().enabled().intersects(DispcIrq::FRAMEDONE1 | DispcIrq::VSYNC1));
}

// ---------------------------------------------------------------------------
// Interrupt demultiplexing
// ---------------------------------------------------------------------------

#[test]
fn frame_done_reaches_only_pipes_on_that_blender() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();
    let vid1 = dss.open_pipe(NodeId::Vid1, client(1)).unwrap();
    let gfx1 = dss.open_pipe(NodeId::Gfx1, client(2)).unwrap();
    let vid2 = dss.open_pipe(NodeId::Vid2, client(3)).unwrap();
    dss.start_client(vid1).unwrap();
    dss.start_client(gfx1).unwrap();
    dss.start_client(vid2).unwrap();

    dss.hal().raise(DispcIrq::FRAMEDONE1.bits());
    dss.isr();

    let mut fired = take_events();
    fired.sort();
    assert_eq!(
        fired,
        [
            (NodeId::Vid1, EventReason::FrameDone, 1),
            (NodeId::Gfx1, EventReason::FrameDone, 2),
        ]
    );
}

#[test]
fn one_callback_per_pipe_per_interrupt() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();
    let vid1 = dss.open_pipe(NodeId::Vid1, client(7)).unwrap();
    dss.start_client(vid1).unwrap();

    dss.hal().raise((DispcIrq::FRAMEDONE1 | DispcIrq::VSYNC1).bits());
    dss.isr();
    assert_eq!(take_events(), [(NodeId::Vid1, EventReason::FrameDone, 7)]);
}

#[test]
fn opened_pipes_receive_nothing() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();
    let _vid1 = dss.open_pipe(NodeId::Vid1, client(1)).unwrap();

    dss.hal().raise(DispcIrq::FRAMEDONE1.bits());
    dss.isr();
    assert!(take_events().is_empty());
}

#[test]
fn status_word_is_cleared_once_with_unknown_bits() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();
    dss.hal().take_calls();

    let raw = DispcIrq::FRAMEDONE1.bits() | (1 << 4) | (1 << 7);
    dss.hal().raise(raw);
    dss.isr();

    let clears: Vec<_> = dss
        .hal()
        .calls()
        .into_iter()
        .filter(|c| matches!(c, HalCall::ClearStatus(_)))
        .collect();
    assert_eq!(clears, [HalCall::ClearStatus(raw)]);
    assert_eq!(dss.hal().pending(), 0);
    assert_eq!(dss.error_stats().total(), 0);
}

#[test]
fn safe_to_push_follows_line_and_frame_events() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();
    assert!(dss.is_safe_to_push(NodeId::Dpi1));
    assert!(!dss.is_safe_to_push(NodeId::Dpi3));

    dss.hal().raise(DispcIrq::PROG_LINE1.bits());
    dss.isr();
    assert!(!dss.is_safe_to_push(NodeId::Dpi1));
    assert!(dss.is_safe_to_push(NodeId::Hdmi));

    dss.hal().raise(DispcIrq::VSYNC1.bits());
    dss.isr();
    assert!(dss.is_safe_to_push(NodeId::Dpi1));

    dss.hal().set_line(123);
    assert_eq!(dss.get_current_line(NodeId::Dpi1), Ok(123));
    assert_eq!(dss.get_current_line(NodeId::Dpi2), Err(DriverError::Fail));
}

#[test]
fn deferred_delivery_queues_until_dispatch() {
    let dss = controller_with(DssInitParams {
        delivery: CallbackDelivery::Deferred,
        ..DssInitParams::default()
    });
    dss.set_config(&two_output_config()).unwrap();
    let vid2 = dss.open_pipe(NodeId::Vid2, client(9)).unwrap();
    dss.start_client(vid2).unwrap();

    dss.hal().raise(DispcIrq::EVSYNC_EVEN.bits());
    dss.isr();
    assert!(take_events().is_empty());
    assert_eq!(dss.pending_events(), 1);

    assert_eq!(dss.dispatch_pending(), 1);
    assert_eq!(take_events(), [(NodeId::Vid2, EventReason::FrameDone, 9)]);
    assert_eq!(dss.pending_events(), 0);
}

#[test]
fn deferred_events_die_with_the_pipe() {
    let dss = controller_with(DssInitParams {
        delivery: CallbackDelivery::Deferred,
        ..DssInitParams::default()
    });
    dss.set_config(&two_output_config()).unwrap();
    let vid1 = dss.open_pipe(NodeId::Vid1, client(42)).unwrap();
    let vid2 = dss.open_pipe(NodeId::Vid2, client(9)).unwrap();
    dss.start_client(vid1).unwrap();
    dss.start_client(vid2).unwrap();

    dss.hal().raise((DispcIrq::FRAMEDONE1 | DispcIrq::EVSYNC_EVEN).bits());
    dss.isr();
    assert_eq!(dss.pending_events(), 2);

    dss.stop_client(vid1).unwrap();
    dss.unregister_client(vid1).unwrap();
    assert_eq!(dss.pending_events(), 1);
    assert_eq!(dss.dispatch_pending(), 1);
    assert_eq!(take_events(), [(NodeId::Vid2, EventReason::FrameDone, 9)]);
}

#[test]
fn restarted_pipe_sees_no_events_from_its_previous_run() {
    let dss = controller_with(DssInitParams {
        delivery: CallbackDelivery::Deferred,
        ..DssInitParams::default()
    });
    dss.set_config(&two_output_config()).unwrap();
    let vid1 = dss.open_pipe(NodeId::Vid1, client(1)).unwrap();
    dss.start_client(vid1).unwrap();
    dss.hal().raise(DispcIrq::FRAMEDONE1.bits());
    dss.isr();

    dss.stop_client(vid1).unwrap();
    dss.register_client(vid1, client(2)).unwrap();
    dss.start_client(vid1).unwrap();
    assert_eq!(dss.dispatch_pending(), 0);
    assert!(take_events().is_empty());

    dss.hal().raise(DispcIrq::FRAMEDONE1.bits());
    dss.isr();
    assert_eq!(dss.dispatch_pending(), 1);
    assert_eq!(take_events(), [(NodeId::Vid1, EventReason::FrameDone, 2)]);
}

#[test]
fn clear_config_empties_the_deferred_queue() {
    let dss = controller_with(DssInitParams {
        delivery: CallbackDelivery::Deferred,
        ..DssInitParams::default()
    });
    dss.set_config(&two_output_config()).unwrap();
    let vid2 = dss.open_pipe(NodeId::Vid2, client(3)).unwrap();
    dss.start_client(vid2).unwrap();
    dss.hal().raise(DispcIrq::EVSYNC_EVEN.bits());
    dss.isr();

    dss.stop_client(vid2).unwrap();
    dss.clear_config().unwrap();
    assert_eq!(dss.pending_events(), 0);
    assert_eq!(dss.dispatch_pending(), 0);
    assert!(take_events().is_empty());
}

#[test]
fn deferred_overflow_counts_drops() {
    let dss = controller_with(DssInitParams {
        delivery: CallbackDelivery::Deferred,
        ..DssInitParams::default()
    });
    dss.set_config(&two_output_config()).unwrap();
    let vid1 = dss.open_pipe(NodeId::Vid1, client(0)).unwrap();
    dss.start_client(vid1).unwrap();

    let depth = photon_dss::config::EVENT_QUEUE_DEPTH;
    for _ in 0..depth + 3 {
        dss.hal().raise(DispcIrq::FRAMEDONE1.bits());
        dss.isr();
    }
    assert_eq!(dss.pending_events(), depth);
    assert_eq!(dss.dropped_events(), 3);
    assert_eq!(dss.dispatch_pending(), depth);
    assert_eq!(take_events().len(), depth);
}

// ---------------------------------------------------------------------------
// Error aggregation
// ---------------------------------------------------------------------------

#[test]
fn underflow_counts_every_interrupt() {
    let dss = controller();
    for _ in 0..4 {
        dss.hal().raise(DispcIrq::VID3_UNDERFLOW.bits());
        dss.isr();
    }
    let stats = dss.error_stats();
    assert_eq!(stats.underflow(NodeId::Vid3), 4);
    assert_eq!(stats.underflow(NodeId::Vid1), 0);
    assert_eq!(stats.total(), 4);
}

#[test]
fn reset_affects_only_that_pipe() {
    let dss = controller();
    dss.hal().raise(
        (DispcIrq::VID1_UNDERFLOW | DispcIrq::VID2_UNDERFLOW | DispcIrq::SYNCLOST1).bits(),
    );
    dss.isr();

    dss.reset_pipe_errors(NodeId::Vid1).unwrap();
    let stats = dss.error_stats();
    assert_eq!(stats.underflow(NodeId::Vid1), 0);
    assert_eq!(stats.underflow(NodeId::Vid2), 1);
    assert_eq!(stats.sync_lost(NodeId::Lcd1), 1);
    assert_eq!(
        dss.reset_pipe_errors(NodeId::Lcd1),
        Err(DriverError::InvalidParams)
    );

    dss.reset_all_errors();
    assert_eq!(dss.error_stats().total(), 0);
}

// ---------------------------------------------------------------------------
// Path queries and write-back
// ---------------------------------------------------------------------------

#[test]
fn path_info_carries_embedded_sync_shift() {
    let dss = controller_with(DssInitParams {
        embedded_sync_shift: 8,
        ..DssInitParams::default()
    });
    let config = DssConfig::new(
        &[
            Edge::new(NodeId::Vid1, NodeId::Lcd2),
            Edge::new(NodeId::Lcd2, NodeId::Dpi2),
            Edge::new(NodeId::Vid2, NodeId::Lcd1),
            Edge::new(NodeId::Lcd1, NodeId::Dpi1),
        ],
        &[
            OutputInfo::standard(NodeId::Dpi2, Standard::Ntsc, VideoInterface::Bt656),
            OutputInfo::standard(NodeId::Dpi1, Standard::Xga60, VideoInterface::Rgb24),
        ],
    )
    .unwrap();
    dss.set_config(&config).unwrap();

    let vid1 = dss.open_pipe(NodeId::Vid1, client(0)).unwrap();
    let path = dss.get_path_info(vid1).unwrap();
    assert_eq!(path.output, NodeId::Dpi2);
    assert_eq!(path.position_shift, 8);
    assert_eq!(path.info.width, 720);
    assert!(path.info.running);

    let vid2 = dss.open_pipe(NodeId::Vid2, client(0)).unwrap();
    assert_eq!(dss.get_path_info(vid2).unwrap().position_shift, 0);
}

#[test]
fn writeback_capture_of_progressive_output() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();
    let wb = dss
        .open_pipe(
            NodeId::Wb,
            ClientInfo::with_mode(record_event, AppToken::new(5), ClientMode::Capture),
        )
        .unwrap();

    assert_eq!(dss.start_client(wb), Err(DriverError::Fail));
    assert_eq!(
        dss.configure_writeback(wb, NodeId::Dpi3),
        Err(DriverError::Fail)
    );
    dss.configure_writeback(wb, NodeId::Dpi1).unwrap();
    assert!(dss.hal().calls().contains(&HalCall::WbSource(NodeId::Dpi1)));
    assert_eq!(dss.get_path_info(wb).unwrap().output, NodeId::Dpi1);

    dss.start_client(wb).unwrap();
    assert!(dss.hal().enabled().contains(DispcIrq::WB_SYNC));

    for _ in 0..2 {
        dss.hal().raise(DispcIrq::WB_SYNC.bits());
        dss.isr();
    }
    assert_eq!(
        take_events(),
        [
            (NodeId::Wb, EventReason::WbCapture, 5),
            (NodeId::Wb, EventReason::WbCapture, 5),
        ]
    );
}

#[test]
fn writeback_capture_of_interlaced_output_waits_for_both_fields() {
    let dss = controller();
    dss.set_config(&two_output_config()).unwrap();
    let wb = dss
        .open_pipe(
            NodeId::Wb,
            ClientInfo::with_mode(record_event, AppToken::new(6), ClientMode::Capture),
        )
        .unwrap();
    dss.configure_writeback(wb, NodeId::Hdmi).unwrap();
    dss.start_client(wb).unwrap();

    dss.hal().raise(DispcIrq::EVSYNC_ODD.bits());
    dss.isr();
    dss.hal().raise((DispcIrq::WB_SYNC | DispcIrq::EVSYNC_EVEN).bits());
    dss.isr();
    assert!(take_events().is_empty());

    dss.hal().raise((DispcIrq::WB_SYNC | DispcIrq::EVSYNC_ODD).bits());
    dss.isr();
    assert_eq!(take_events(), [(NodeId::Wb, EventReason::WbCapture, 6)]);
}

#[test]
fn writeback_region_mode_toggles_on_sync_with_region_end() {
    let dss = controller();
    let wb = dss
        .open_pipe(
            NodeId::Wb,
            ClientInfo::with_mode(record_event, AppToken::new(0), ClientMode::MemToMem),
        )
        .unwrap();
    dss.start_client(wb).unwrap();

    dss.hal().raise((DispcIrq::WB_SYNC | DispcIrq::WB_REGION_END).bits());
    dss.isr();
    assert!(dss.hal().calls().contains(&HalCall::WbRegion(true)));
    assert_eq!(take_events().len(), 1);
}
