//! Logger capture, queue-movement diagnostics, and the describe traversal.
//!
//! Runs as its own binary so the global log buffer only sees this file's
//! traffic. The capture test is a single function: the buffer and the
//! level filter are process-wide.

use strata_sched::{logger, Level, LoopbackCtx, Scheduler, Thread};

#[test]
fn queue_movement_lines_carry_tick_thread_and_level() {
    logger::init();
    let _ = logger::take();

    let mut sched = Scheduler::new();
    let mut ctx = LoopbackCtx::new();

    // Admission at tick 12, into L3.
    ctx.advance_ticks(12);
    let t = Box::new(Thread::new_kernel("logged", 45, 5));
    let id = t.id();
    sched.mark_ready(t, &mut ctx);

    // Three silent passes, then the boost and the band promotion at 20.
    for _ in 0..3 {
        sched.age_all(&mut ctx);
    }
    ctx.advance_ticks(8);
    sched.age_all(&mut ctx);

    // Selection at tick 25, then a dispatch pair ending in the reclaim.
    ctx.advance_ticks(5);
    let picked = sched.select_next(&mut ctx).unwrap();
    sched.bootstrap(Box::new(Thread::new_kernel("boot", 0, 0)), &mut ctx);
    sched.dispatch(picked, false, &mut ctx);
    ctx.advance_ticks(5);
    assert!(sched.finish_current(&mut ctx));
    sched.log_stats();

    let captured = logger::take();
    let expected = [
        format!("[InsertToQueue] Tick [12]: Thread [{}] is inserted into queue L[3]", id),
        format!("[UpdatePriority] Tick [20]: Thread [{}] changes its priority from [45] to [55]", id),
        format!("[RemoveFromQueue] Tick [20]: Thread [{}] is removed from queue L[3]", id),
        format!("[InsertToQueue] Tick [20]: Thread [{}] is inserted into queue L[2]", id),
        format!("[RemoveFromQueue] Tick [25]: Thread [{}] is removed from queue L[2]", id),
        format!("[Reclaim] Tick [30]: Thread [{}] destroyed", id),
        "[INFO ] [Stats] switches=".to_string(),
    ];
    for line in &expected {
        assert!(captured.contains(line), "missing {:?} in:\n{}", line, captured);
    }

    // Lines appear in event order.
    let mut last = 0;
    for line in &expected {
        let pos = captured.find(line.as_str()).unwrap();
        assert!(pos >= last, "{:?} out of order", line);
        last = pos;
    }
}

#[test]
fn describe_walks_levels_front_to_back() {
    let mut sched = Scheduler::new();
    let mut ctx = LoopbackCtx::new();

    let l1_long = Box::new(Thread::new_kernel("l1-long", 120, 30));
    let l1_short = Box::new(Thread::new_kernel("l1-short", 120, 10));
    let l2 = Box::new(Thread::new_kernel("l2", 60, 5));
    let l3_first = Box::new(Thread::new_kernel("l3-first", 10, 5));
    let l3_second = Box::new(Thread::new_kernel("l3-second", 10, 5));

    let expected = [
        (l1_short.id(), Level::L1), // shortest burst at the L1 front
        (l1_long.id(), Level::L1),
        (l2.id(), Level::L2),
        (l3_first.id(), Level::L3),
        (l3_second.id(), Level::L3),
    ];

    sched.mark_ready(l1_long, &mut ctx);
    sched.mark_ready(l1_short, &mut ctx);
    sched.mark_ready(l2, &mut ctx);
    sched.mark_ready(l3_first, &mut ctx);
    sched.mark_ready(l3_second, &mut ctx);

    let mut seen = Vec::new();
    sched.describe(&ctx, |thread, level| seen.push((thread.id(), level)));
    assert_eq!(seen, expected);
}
