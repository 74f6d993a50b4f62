//! The recurring render task.
//!
//! Hosts own the actual frame callback (`requestAnimationFrame`, a terminal
//! loop). This type decides when a callback may be scheduled and whether a
//! callback that fires is still current, so a frame is never scheduled twice
//! and stale callbacks after a suspend are ignored.

/// Identifies one scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Nothing scheduled; the next `request` schedules a frame
    Idle,
    /// A callback carrying this ticket is pending
    Scheduled(FrameTicket),
    /// The document is hidden; frames are not scheduled
    Suspended,
    /// The environment cannot render; never scheduled again
    Disabled,
}

#[derive(Debug, Clone)]
pub struct RenderTask {
    state: TaskState,
    generation: u64,
}

impl RenderTask {
    pub fn new() -> Self {
        Self {
            state: TaskState::Idle,
            generation: 0,
        }
    }

    /// A task that will never run
    pub fn disabled() -> Self {
        Self {
            state: TaskState::Disabled,
            generation: 0,
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Ask for a frame. Returns the ticket the host must schedule, or `None`
    /// if a frame is already pending or the task is suspended or disabled.
    pub fn request(&mut self) -> Option<FrameTicket> {
        match self.state {
            TaskState::Idle => {
                self.generation += 1;
                let ticket = FrameTicket(self.generation);
                self.state = TaskState::Scheduled(ticket);
                Some(ticket)
            }
            _ => None,
        }
    }

    /// Called when a host callback fires. Returns whether the frame should run.
    pub fn begin_frame(&mut self, ticket: FrameTicket) -> bool {
        match self.state {
            TaskState::Scheduled(current) if current == ticket => {
                self.state = TaskState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Called after drawing. Returns the next ticket to schedule, if any.
    pub fn end_frame(&mut self, visible: bool) -> Option<FrameTicket> {
        if !visible {
            self.suspend();
            return None;
        }
        self.request()
    }

    /// Stop scheduling frames. Any pending callback becomes stale.
    pub fn suspend(&mut self) {
        if self.state != TaskState::Disabled {
            log::debug!("render task suspended");
            self.state = TaskState::Suspended;
        }
    }

    /// Resume after a suspend with exactly one fresh frame
    pub fn resume(&mut self) -> Option<FrameTicket> {
        if self.state == TaskState::Suspended {
            log::debug!("render task resumed");
            self.state = TaskState::Idle;
        }
        self.request()
    }

    pub fn set_visible(&mut self, visible: bool) -> Option<FrameTicket> {
        if visible {
            self.resume()
        } else {
            self.suspend();
            None
        }
    }

    /// Permanently stop the task
    pub fn disable(&mut self) {
        self.state = TaskState::Disabled;
    }

    pub fn is_disabled(&self) -> bool {
        self.state == TaskState::Disabled
    }
}

impl Default for RenderTask {
    fn default() -> Self {
        Self::new()
    }
}
