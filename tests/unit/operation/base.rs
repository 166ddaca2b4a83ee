use super::*;

#[derive(Debug)]
struct Passthrough {
    base: NodeOperationBase,
    input: Option<OperationId>,
}

impl Passthrough {
    fn new(resolution_input: usize) -> Self {
        let mut base = NodeOperationBase::new();
        base.add_input_socket(DataType::Value);
        base.add_input_socket(DataType::Color);
        base.add_output_socket(DataType::Color);
        base.set_resolution_input_socket_index(resolution_input);
        Self { base, input: None }
    }
}

impl NodeOperation for Passthrough {
    fn name(&self) -> &'static str {
        "Passthrough"
    }

    fn base(&self) -> &NodeOperationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeOperationBase {
        &mut self.base
    }

    fn init_execution(&mut self) {
        self.input = self.base.input_socket_reader(1);
    }

    fn deinit_execution(&mut self) {
        self.input = None;
    }

    fn execute_pixel_sampled(
        &self,
        graph: &OperationGraph,
        output: &mut [f32; 4],
        x: f32,
        y: f32,
        sampler: PixelSampler,
    ) {
        graph.read_sampled(resolved_reader(self.input, self.name()), output, x, y, sampler);
    }
}

fn sized_leaf(width: u32, height: u32) -> crate::operation::buffer_op::BufferOperation {
    let rect = Rect::from_size(width, height);
    let buf = MemoryBuffer::single_elem(4, rect, &[0.5, 0.5, 0.5, 1.0]).unwrap();
    crate::operation::buffer_op::BufferOperation::new(std::sync::Arc::new(buf), DataType::Color)
}

#[test]
fn sockets_keep_declared_types() {
    let op = Passthrough::new(1);
    assert_eq!(op.base().inputs()[0].data_type(), DataType::Value);
    assert_eq!(op.base().inputs()[1].data_type(), DataType::Color);
    assert_eq!(op.base().outputs()[0].data_type(), DataType::Color);
    assert_eq!(op.base().state(), ExecutionState::Uninitialized);
}

#[test]
fn resolution_follows_configured_socket_not_declaration_order() {
    let mut graph = OperationGraph::new();
    let small = graph.add(sized_leaf(4, 4));
    let large = graph.add(sized_leaf(32, 16));
    let by_color = graph.add(Passthrough::new(1));
    let by_value = graph.add(Passthrough::new(0));
    for op in [by_color, by_value] {
        graph.connect(small, op, 0).unwrap();
        graph.connect(large, op, 1).unwrap();
    }

    let preferred = Resolution::new(2, 2).unwrap();
    assert_eq!(
        graph.resolution_of(by_color, preferred),
        Resolution::new(32, 16).unwrap()
    );
    assert_eq!(
        graph.resolution_of(by_value, preferred),
        Resolution::new(4, 4).unwrap()
    );
}

#[test]
fn filtered_read_defaults_to_bilinear_sample() {
    let mut graph = OperationGraph::new();
    let rect = Rect::from_size(4, 1);
    let buf = MemoryBuffer::from_data(1, rect, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
    let leaf = graph.add(crate::operation::buffer_op::BufferOperation::new(
        std::sync::Arc::new(buf),
        DataType::Value,
    ));
    let value = graph.add(crate::operation::constant::ConstantOperation::value(0.0));
    let op = graph.add(Passthrough::new(1));
    graph.connect(value, op, 0).unwrap();
    graph.connect(leaf, op, 1).unwrap();
    graph.init_execution().unwrap();

    let mut filtered = [0.0; 4];
    let mut bilinear = [0.0; 4];
    graph.read_filtered(op, &mut filtered, 1.5, 0.0, [8.0, 0.0], [0.0, 8.0]);
    graph.read_sampled(op, &mut bilinear, 1.5, 0.0, PixelSampler::Bilinear);
    assert_eq!(filtered, bilinear);
}

#[test]
fn link_input_rejects_out_of_range_socket() {
    let mut base = NodeOperationBase::new();
    base.add_input_socket(DataType::Value);
    assert!(base.link_input(1, OperationId(0)).is_err());
    assert!(base.link_input(0, OperationId(0)).is_ok());
    assert_eq!(base.input_socket_reader(0), Some(OperationId(0)));
}

#[test]
#[should_panic(expected = "outside init_execution")]
fn resolved_reader_panics_when_unset() {
    let _ = resolved_reader(None, "Test");
}
