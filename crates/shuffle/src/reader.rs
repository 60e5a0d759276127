use arrow::record_batch::RecordBatch;

use aex_common::Result;
use aex_planner::{PostShufflePartition, PostShufflePlan};

use crate::dependency::ShuffleHandle;

/// Row stream produced by the transport: `(pre_partition_id, batch)` pairs.
pub type ShuffleRowStream = Box<dyn Iterator<Item = Result<(u32, RecordBatch)>> + Send>;

/// External shuffle transport seam.
///
/// `map_task_restriction`, when set, limits the fetch to that single map
/// task's blocks for the entire `[pre_start, pre_end)` range.
pub trait ShuffleTransport: Send + Sync {
    fn get_reader(
        &self,
        handle: &ShuffleHandle,
        pre_start: u32,
        pre_end: u32,
        map_task_restriction: Option<u32>,
    ) -> Result<ShuffleRowStream>;
}

/// Thin adapter from post-shuffle partitions to transport reader calls.
///
/// Makes exactly one transport call per post-shuffle partition and discards
/// the pre-partition ids the transport yields; the post-partition assignment
/// already implies them.
pub struct PostShuffleReader<'a, T: ShuffleTransport + ?Sized> {
    transport: &'a T,
    handle: ShuffleHandle,
}

impl<'a, T: ShuffleTransport + ?Sized> PostShuffleReader<'a, T> {
    pub fn new(transport: &'a T, handle: ShuffleHandle) -> Self {
        Self { transport, handle }
    }

    pub fn read_partition(&self, partition: &PostShufflePartition) -> Result<Vec<RecordBatch>> {
        let reader = self.transport.get_reader(
            &self.handle,
            partition.pre_start,
            partition.pre_end,
            partition.map_task_restriction,
        )?;
        reader
            .map(|item| item.map(|(_, batch)| batch))
            .collect::<Result<Vec<_>>>()
    }

    pub fn read_plan(&self, plan: &PostShufflePlan) -> Result<Vec<Vec<RecordBatch>>> {
        plan.iter().map(|p| self.read_partition(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use arrow::array::Int64Array;
    use arrow_schema::{DataType, Field, Schema};

    use aex_common::{QueryId, StageId};
    use aex_planner::PostShufflePlan;

    use super::*;

    fn batch(value: i64) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int64, false)]));
        RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![value]))])
            .expect("build batch")
    }

    #[derive(Default)]
    struct RecordingTransport {
        calls: Mutex<Vec<(u32, u32, Option<u32>)>>,
    }

    impl ShuffleTransport for RecordingTransport {
        fn get_reader(
            &self,
            _handle: &ShuffleHandle,
            pre_start: u32,
            pre_end: u32,
            map_task_restriction: Option<u32>,
        ) -> Result<ShuffleRowStream> {
            self.calls
                .lock()
                .expect("calls lock")
                .push((pre_start, pre_end, map_task_restriction));
            let rows = (pre_start..pre_end)
                .map(|pre| Ok((pre, batch(i64::from(pre)))))
                .collect::<Vec<_>>();
            Ok(Box::new(rows.into_iter()))
        }
    }

    fn handle() -> ShuffleHandle {
        ShuffleHandle {
            query: QueryId(7),
            stage: StageId(3),
        }
    }

    #[test]
    fn one_transport_call_per_post_partition() {
        let transport = RecordingTransport::default();
        let reader = PostShuffleReader::new(&transport, handle());
        let plan = PostShufflePlan::coalesced(5, &[0, 1, 3, 4]);

        let batches = reader.read_plan(&plan).expect("read plan");

        assert_eq!(batches.len(), 4);
        assert_eq!(
            *transport.calls.lock().expect("calls lock"),
            vec![(0, 1, None), (1, 3, None), (3, 4, None), (4, 5, None)]
        );
    }

    #[test]
    fn partition_ids_are_stripped_from_rows() {
        let transport = RecordingTransport::default();
        let reader = PostShuffleReader::new(&transport, handle());
        let plan = PostShufflePlan::coalesced(3, &[0]);

        let batches = reader.read_partition(&plan.partitions[0]).expect("read");
        assert_eq!(batches.len(), 3);
        for b in &batches {
            assert_eq!(b.num_rows(), 1);
        }
    }

    #[test]
    fn map_task_restriction_reaches_the_transport() {
        let transport = RecordingTransport::default();
        let reader = PostShuffleReader::new(&transport, handle());
        let plan = PostShufflePlan::map_task_preserving(4, 2);

        reader.read_plan(&plan).expect("read plan");
        assert_eq!(
            *transport.calls.lock().expect("calls lock"),
            vec![(0, 4, Some(0)), (0, 4, Some(1))]
        );
    }
}
