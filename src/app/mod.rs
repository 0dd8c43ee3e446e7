//! Application use cases.

mod trigger;

pub use trigger::{
    trigger_add_word, trigger_create, trigger_delete, trigger_find_by_name, trigger_get,
    trigger_list, trigger_words, TriggerCreateReq, TriggerDto, TriggerWordDto,
};
