pub mod accumulation;
