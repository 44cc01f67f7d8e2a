use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use flowctl::primitive::{
    Command, ControlCall, ControlPrimitive, MemoryConfig, MemoryPrimitive, PrimitiveError, EBADF,
    ENOTSUP, EPERM,
};
use flowctl::{FlowControl, FlowDescriptor, FlowFlags, QosSpec, FLAGS_SENTINEL};

fn setup() -> (FlowControl<MemoryPrimitive>, FlowDescriptor) {
    let ctl = FlowControl::new(MemoryPrimitive::default());
    let fd = ctl.primitive().open().unwrap();
    (ctl, fd)
}

/// Fails every call with a fixed error and counts invocations.
struct FailingPrimitive {
    error: PrimitiveError,
    calls: AtomicUsize,
}

impl FailingPrimitive {
    fn new(error: PrimitiveError) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }
}

impl ControlPrimitive for FailingPrimitive {
    fn control(
        &self,
        _fd: FlowDescriptor,
        _call: ControlCall<'_>,
    ) -> flowctl::primitive::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error)
    }
}

#[test]
fn receive_timeout_round_trips() {
    let (ctl, fd) = setup();
    ctl.set_recv_timeout(fd, Duration::from_millis(2500)).unwrap();
    assert_eq!(ctl.recv_timeout(fd).unwrap(), Duration::from_secs_f64(2.5));
}

#[test]
fn send_and_receive_timeouts_are_independent() {
    let (ctl, fd) = setup();
    ctl.set_send_timeout(fd, Duration::from_secs(1)).unwrap();
    ctl.set_recv_timeout(fd, Duration::from_secs(3)).unwrap();
    assert_eq!(ctl.send_timeout(fd).unwrap(), Duration::from_secs(1));
    assert_eq!(ctl.recv_timeout(fd).unwrap(), Duration::from_secs(3));
}

#[test]
fn zero_timeout_is_a_value_not_a_clear() {
    let (ctl, fd) = setup();
    ctl.set_send_timeout(fd, Duration::ZERO).unwrap();
    assert_eq!(ctl.send_timeout(fd).unwrap(), Duration::ZERO);
}

#[test]
fn unset_send_timeout_fails_and_leaves_slot() {
    let (ctl, fd) = setup();
    let mut slot = Duration::from_secs(42);
    let err = ctl.send_timeout_into(fd, &mut slot).unwrap_err();
    assert_eq!(err.command(), Command::GetSendTimeout);
    assert_eq!(err.fd(), fd);
    assert!(err.is_permission_denied());
    assert_eq!(slot, Duration::from_secs(42));
}

#[test]
fn cleared_timeout_reads_as_unset() {
    let (ctl, fd) = setup();
    ctl.set_recv_timeout(fd, Duration::from_secs(5)).unwrap();
    ctl.clear_recv_timeout(fd).unwrap();
    assert_eq!(ctl.recv_timeout(fd).unwrap_err().errno(), EPERM);
}

#[test]
fn qos_reports_allocation_spec() {
    let ctl = FlowControl::new(MemoryPrimitive::default());
    let spec = QosSpec::default().with_delay(30).with_in_order(true);
    let fd = ctl.primitive().open_with_qos(spec).unwrap();
    assert_eq!(ctl.qos(fd).unwrap(), spec);

    let mut slot = QosSpec::default();
    ctl.qos_into(fd, &mut slot).unwrap();
    assert_eq!(slot, spec);
}

#[test]
fn queue_lengths_per_direction() {
    let (ctl, fd) = setup();
    assert!(ctl.primitive().set_queue_lengths(fd, 3, 11));
    assert_eq!(ctl.rx_queue_len(fd).unwrap(), 3);
    assert_eq!(ctl.tx_queue_len(fd).unwrap(), 11);

    let mut slot = 0;
    ctl.tx_queue_len_into(fd, &mut slot).unwrap();
    assert_eq!(slot, 11);
}

#[test]
fn flags_set_then_get() {
    let (ctl, fd) = setup();
    let flags =
        FlowFlags::WRITE_ONLY | FlowFlags::NON_BLOCKING_WRITE | FlowFlags::NO_PARTIAL_WRITE;
    ctl.set_flags(fd, flags).unwrap();
    assert_eq!(ctl.flags(fd).unwrap(), flags);
    assert_eq!(ctl.flags_or_sentinel(fd), flags.bits() as i32);
}

#[test]
fn denied_flow_reports_sentinel_for_flags() {
    let (ctl, fd) = setup();
    assert!(ctl.primitive().deny(fd));

    let err = ctl.flags(fd).unwrap_err();
    assert_eq!(err.errno(), EPERM);
    assert_eq!(ctl.flags_or_sentinel(fd), FLAGS_SENTINEL);
}

#[test]
fn closed_descriptor_fails_every_operation() {
    let (ctl, fd) = setup();
    assert!(ctl.primitive().close(fd));

    let errors = [
        ctl.set_send_timeout(fd, Duration::from_secs(1)).unwrap_err(),
        ctl.set_recv_timeout(fd, Duration::from_secs(1)).unwrap_err(),
        ctl.send_timeout(fd).unwrap_err(),
        ctl.recv_timeout(fd).unwrap_err(),
        ctl.qos(fd).unwrap_err(),
        ctl.rx_queue_len(fd).unwrap_err(),
        ctl.tx_queue_len(fd).unwrap_err(),
        ctl.set_flags(fd, FlowFlags::READ_ONLY).unwrap_err(),
        ctl.flags(fd).unwrap_err(),
    ];
    for err in errors {
        assert_eq!(err.errno(), EBADF, "{err}");
    }
    assert_eq!(ctl.flags_or_sentinel(fd), FLAGS_SENTINEL);
    assert_eq!(ctl.flags_or_sentinel(FlowDescriptor::new(-1)), FLAGS_SENTINEL);
}

#[test]
fn each_operation_calls_primitive_once() {
    let (ctl, fd) = setup();
    let mem = ctl.primitive();

    ctl.set_send_timeout(fd, Duration::from_secs(1)).unwrap();
    ctl.send_timeout(fd).unwrap();
    ctl.clear_recv_timeout(fd).unwrap();
    let _ = ctl.recv_timeout(fd);
    ctl.qos(fd).unwrap();
    ctl.rx_queue_len(fd).unwrap();
    ctl.tx_queue_len(fd).unwrap();
    ctl.set_flags(fd, FlowFlags::READ_WRITE).unwrap();
    ctl.flags(fd).unwrap();
    ctl.flags_or_sentinel(fd);

    assert_eq!(mem.calls(), 10);
    assert_eq!(mem.calls_for(Command::GetFlags), 2);
    for command in Command::ALL {
        assert!(mem.calls_for(command) >= 1, "{command} not called");
    }
}

#[test]
fn failures_are_not_retried() {
    let fd = FlowDescriptor::new(5);
    let operations: [(Command, fn(&FlowControl<FailingPrimitive>, FlowDescriptor) -> bool); 9] = [
        (Command::SetSendTimeout, |ctl, fd| {
            ctl.set_send_timeout(fd, Duration::from_secs(1)).is_err()
        }),
        (Command::SetRecvTimeout, |ctl, fd| ctl.clear_recv_timeout(fd).is_err()),
        (Command::GetSendTimeout, |ctl, fd| ctl.send_timeout(fd).is_err()),
        (Command::GetRecvTimeout, |ctl, fd| ctl.recv_timeout(fd).is_err()),
        (Command::GetQos, |ctl, fd| ctl.qos(fd).is_err()),
        (Command::GetRxQueueLen, |ctl, fd| ctl.rx_queue_len(fd).is_err()),
        (Command::GetTxQueueLen, |ctl, fd| ctl.tx_queue_len(fd).is_err()),
        (Command::SetFlags, |ctl, fd| ctl.set_flags(fd, FlowFlags::DOWN).is_err()),
        (Command::GetFlags, |ctl, fd| ctl.flags_or_sentinel(fd) == FLAGS_SENTINEL),
    ];

    for (command, operation) in operations {
        let ctl = FlowControl::new(FailingPrimitive::new(PrimitiveError::NOT_SUPPORTED));
        assert!(operation(&ctl, fd), "{command} did not fail");
        assert_eq!(ctl.into_inner().calls.load(Ordering::SeqCst), 1, "{command}");
    }

    let ctl = FlowControl::new(FailingPrimitive::new(PrimitiveError::NOT_SUPPORTED));
    let err = ctl.rx_queue_len(fd).unwrap_err();
    assert_eq!(err.errno(), ENOTSUP);
    assert_eq!(err.command(), Command::GetRxQueueLen);
    assert_eq!(err.primitive_error(), PrimitiveError::NOT_SUPPORTED);
}

#[test]
fn unsupported_command_is_propagated_unchanged() {
    let ctl = FlowControl::new(MemoryPrimitive::new(MemoryConfig {
        unsupported: vec![Command::GetTxQueueLen],
        ..MemoryConfig::default()
    }));
    let fd = ctl.primitive().open().unwrap();
    assert_eq!(ctl.tx_queue_len(fd).unwrap_err().errno(), ENOTSUP);
    assert_eq!(ctl.rx_queue_len(fd).unwrap(), 0);
}

#[test]
fn flags_above_int_range_collapse_to_sentinel() {
    let (ctl, fd) = setup();
    ctl.set_flags(fd, FlowFlags::from_bits_retain(0x8000_0002)).unwrap();
    assert_eq!(ctl.flags(fd).unwrap().bits(), 0x8000_0002);
    assert_eq!(ctl.flags_or_sentinel(fd), FLAGS_SENTINEL);
}

#[test]
fn flow_view_edits_flags() {
    let (ctl, fd) = setup();
    let flow = ctl.flow(fd);
    flow.insert_flags(FlowFlags::NON_BLOCKING).unwrap();
    assert!(flow.flags().unwrap().contains(FlowFlags::NON_BLOCKING));
    flow.remove_flags(FlowFlags::NON_BLOCKING_READ).unwrap();

    let flags = flow.flags().unwrap();
    assert!(flags.contains(FlowFlags::NON_BLOCKING_WRITE));
    assert!(!flags.contains(FlowFlags::NON_BLOCKING_READ));
    assert_eq!(flow.fd(), fd);
}

#[test]
fn shared_primitive_across_threads() {
    let mem = Arc::new(MemoryPrimitive::default());
    let ctl = FlowControl::new(Arc::clone(&mem));
    let fds: Vec<_> = (0..4).map(|_| mem.open().unwrap()).collect();

    std::thread::scope(|scope| {
        for (i, fd) in fds.iter().copied().enumerate() {
            let ctl = &ctl;
            scope.spawn(move || {
                let timeout = Duration::from_millis(100 * (i as u64 + 1));
                for _ in 0..50 {
                    ctl.set_send_timeout(fd, timeout).unwrap();
                    assert_eq!(ctl.send_timeout(fd).unwrap(), timeout);
                }
            });
        }
    });

    assert_eq!(mem.calls(), 4 * 50 * 2);
}

#[test]
fn error_message_names_command_and_descriptor() {
    let (ctl, fd) = setup();
    let err = ctl.send_timeout(fd).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "FLOWGSNDTIMEO on fd {} failed: control primitive failed with errno {EPERM}",
            fd.raw()
        )
    );
    let io_err: std::io::Error = err.into();
    assert_eq!(io_err.kind(), std::io::ErrorKind::PermissionDenied);
}
