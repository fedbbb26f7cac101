pub mod confetti_layer;
pub mod dictation_area;
pub mod progress_bar;
pub mod sentence_list;
