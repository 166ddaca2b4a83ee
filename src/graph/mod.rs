pub(crate) mod operation_graph;
