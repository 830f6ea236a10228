pub mod mmdc;
