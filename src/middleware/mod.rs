pub mod sharer;
