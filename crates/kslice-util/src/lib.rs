pub mod fifo_heap;
pub mod line_index;
