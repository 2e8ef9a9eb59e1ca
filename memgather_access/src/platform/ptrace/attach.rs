use thiserror::Error;

use crate::common::{self_pid, Pid};

#[derive(Debug, Error)]
pub enum PtraceAttachError {
	#[error("cannot pause the calling process")]
	SelfAttach,
	#[error("ptrace(PTRACE_ATTACH) failed")]
	PtraceAttach(#[source] std::io::Error),
	#[error("waitpid failed")]
	WaitpidError(#[source] std::io::Error),
	#[error("waitpid reported pid {actual} while waiting for {expected}")]
	WaitMismatch { expected: Pid, actual: Pid },
	#[error("process did not stop after attach (wait status {0:#x})")]
	NotStopped(libc::c_int)
}

#[derive(Debug, Error)]
pub enum PtraceDetachError {
	#[error("ptrace(PTRACE_DETACH) failed")]
	PtraceDetach(#[source] std::io::Error)
}

/// Ptrace attachment to a process, which keeps the process stopped.
///
/// The process is detached exactly once: either explicitly through [`detach`](PtraceAttachment::detach),
/// or on drop.
#[derive(Debug)]
pub struct PtraceAttachment {
	pid: Pid,
	attached: bool
}
impl PtraceAttachment {
	/// Attaches to the process with `pid` and waits until it is stopped.
	pub fn attach(pid: Pid) -> Result<Self, PtraceAttachError> {
		if pid == self_pid() {
			return Err(PtraceAttachError::SelfAttach)
		}

		let mut attachment = PtraceAttachment {
			pid,
			attached: false
		};

		// on error `attachment` is dropped, which detaches if the attach itself went through
		unsafe {
			attachment.ptrace_attach()?;
			attachment.wait_for_stop()?;
		}
		log::debug!("attached to process {}", pid);

		Ok(attachment)
	}

	pub const fn pid(&self) -> Pid {
		self.pid
	}

	pub const fn attached(&self) -> bool {
		self.attached
	}

	/// Detaches from the process, resuming it.
	///
	/// No further detach is attempted on drop, even if this one fails.
	pub fn detach(mut self) -> Result<(), PtraceDetachError> {
		unsafe { self.ptrace_detach() }
	}

	unsafe fn ptrace_attach(&mut self) -> Result<(), PtraceAttachError> {
		debug_assert!(!self.attached);

		if libc::ptrace(libc::PTRACE_ATTACH, self.pid, 0, 0) != 0 {
			return Err(PtraceAttachError::PtraceAttach(std::io::Error::last_os_error()))
		}
		self.attached = true;

		Ok(())
	}

	unsafe fn wait_for_stop(&mut self) -> Result<(), PtraceAttachError> {
		let mut status: libc::c_int = 0;

		// blocks until the SIGSTOP sent by the attach is delivered
		let waitpid_res = libc::waitpid(self.pid, &mut status, 0);
		if waitpid_res == -1 {
			return Err(PtraceAttachError::WaitpidError(std::io::Error::last_os_error()))
		}
		if waitpid_res != self.pid {
			return Err(PtraceAttachError::WaitMismatch {
				expected: self.pid,
				actual: waitpid_res
			})
		}
		if !libc::WIFSTOPPED(status) {
			return Err(PtraceAttachError::NotStopped(status))
		}

		Ok(())
	}

	unsafe fn ptrace_detach(&mut self) -> Result<(), PtraceDetachError> {
		debug_assert!(self.attached);

		// never retried, whatever the outcome
		self.attached = false;
		if libc::ptrace(libc::PTRACE_DETACH, self.pid, 0, 0) != 0 {
			return Err(PtraceDetachError::PtraceDetach(std::io::Error::last_os_error()))
		}
		log::debug!("detached from process {}", self.pid);

		Ok(())
	}
}
impl Drop for PtraceAttachment {
	fn drop(&mut self) {
		if self.attached {
			if let Err(err) = unsafe { self.ptrace_detach() } {
				log::warn!("could not detach from process {}: {}", self.pid, err);
			}
		}
	}
}
