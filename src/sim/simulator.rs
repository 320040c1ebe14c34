//! 仿真器
//!
//! 定义事件驱动仿真器，维护当前时间与事件队列。

use super::event::Event;
use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use super::world::World;
use std::collections::BinaryHeap;
use tracing::{debug, info, trace, warn};

/// 事件驱动仿真器：维护当前时间与事件队列。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    dispatched: u64,
    q: BinaryHeap<ScheduledEvent>,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 队列是否已空
    pub fn finished(&self) -> bool {
        self.q.is_empty()
    }

    /// 队列中待执行的事件数
    pub fn pending(&self) -> usize {
        self.q.len()
    }

    /// 已执行的事件总数
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// 调度事件在指定时间执行。
    ///
    /// 早于当前时间的 `at` 会被钳到 `now`：时间不会倒流。
    #[tracing::instrument(skip(self, ev), fields(event_type = ev.name(), schedule_at = ?at))]
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) {
        let at = if at < self.now {
            warn!(now = ?self.now, "调度时间早于当前时间，钳到 now");
            self.now
        } else {
            at
        };

        let seq = self.next_seq;
        trace!(now = ?self.now, seq, "调度事件");

        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent {
            at,
            seq,
            ev: Box::new(ev),
        });

        debug!(queue_size = self.q.len(), "事件已加入队列");
    }

    /// 在 `now + delay` 调度事件。
    pub fn schedule_in<E: Event>(&mut self, delay: SimTime, ev: E) {
        let at = self.now.saturating_add(delay);
        self.schedule(at, ev);
    }

    /// 执行最早的一个事件；队列为空时返回 `false`。
    ///
    /// 事件内部以零延迟调度的新事件只会入队，由之后的 `proceed` 处理。
    pub fn proceed(&mut self, world: &mut dyn World) -> bool {
        let Some(item) = self.q.pop() else {
            return false;
        };
        self.now = item.at;
        self.dispatched += 1;

        debug!(
            event_num = self.dispatched,
            now = ?self.now,
            seq = item.seq,
            remaining_queue = self.q.len(),
            "执行事件"
        );

        item.ev.execute(self, world);
        world.on_tick(self);
        true
    }

    /// 运行直到事件队列为空或到达 `until`。
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) {
        while let Some(top) = self.q.peek() {
            if top.at > until {
                break;
            }
            self.proceed(world);
        }
        self.now = self.now.max(until);
    }

    /// 运行所有事件直到队列为空。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World) {
        info!("▶️  开始运行仿真");
        debug!(now = ?self.now, queue_size = self.q.len(), "初始状态");

        let start = self.dispatched;
        while !self.finished() {
            self.proceed(world);
        }

        info!(
            total_events = self.dispatched - start,
            final_time = ?self.now,
            "✅ 仿真完成"
        );
    }
}
