pub mod edit_approval;

pub use edit_approval::{
    decode_listable, EditApproval, EditApprovalRow, EditSubject, MergedTarget, ModChanges,
    ModVersionChanges, NewEditApproval, MODS_TABLE, MOD_VERSIONS_TABLE,
};
