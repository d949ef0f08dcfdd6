use thiserror::Error;

/// Error values returned by skin compaction and slot library operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("bone {index} has no bind pose ({len} bind poses available)")]
    BindPoseOutOfRange { index: u32, len: usize },

    #[error("bone {index} has no bone reference ({len} bones available)")]
    BoneReferenceOutOfRange { index: u32, len: usize },

    #[error("library index {index} is out of range for {len} entries")]
    LibraryIndexOutOfRange { index: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_bind_pose_error_when_formatted_then_index_and_len_are_included() {
        let error = SlotError::BindPoseOutOfRange { index: 9, len: 4 };

        let message = error.to_string();
        assert!(message.contains('9'));
        assert!(message.contains('4'));
    }
}
