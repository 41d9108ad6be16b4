pub mod display_data;
pub mod execute_error;
pub mod execute_reply;
pub mod execute_request;
pub mod execute_result;
pub mod exception;
pub mod header;
pub mod help_link;
pub mod jupyter_message;
pub mod kernel_info_reply;
pub mod kernel_info_request;
pub mod language_info;
pub mod status;
pub mod stream;
pub mod update_display_data;
pub mod wire_message;
