use crate::types::action::FunctionId;

/// Device level side effects requested by a function key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootRequest {
    JumpToBootloader,
}

/// Run the function with the given id.
///
/// Unknown function ids are ignored.
pub fn dispatch(id: u8) -> Option<BootRequest> {
    match FunctionId::from_repr(id) {
        Some(FunctionId::Bootloader) => Some(BootRequest::JumpToBootloader),
        None => {
            debug!("Function {} is not defined", id);
            None
        }
    }
}

/// Execute the request. On the device this doesn't return.
pub fn perform(request: BootRequest) {
    match request {
        BootRequest::JumpToBootloader => jump_to_bootloader(),
    }
}

pub fn jump_to_bootloader() {
    warn!("Jumping to bootloader!");

    // For cortex-m:
    #[cfg(all(target_arch = "arm", target_os = "none"))]
    cortex_m::peripheral::SCB::sys_reset();

    #[cfg(not(all(target_arch = "arm", target_os = "none")))]
    warn!("No bootloader to jump to on this target");
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dispatch() {
        assert_eq!(dispatch(FunctionId::Bootloader as u8), Some(BootRequest::JumpToBootloader));
        assert_eq!(dispatch(99), None);
    }
}
