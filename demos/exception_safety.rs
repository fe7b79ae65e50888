use dynamic_array::DynamicArray;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Tracked(usize, Arc<AtomicUsize>);

impl Drop for Tracked {
    fn drop(&mut self) {
        println!("Dropping element {}", self.0);
        self.1.fetch_add(1, Ordering::SeqCst);
    }
}

fn main() {
    println!("--- Drop Discipline Example ---");
    let drop_count = Arc::new(AtomicUsize::new(0));

    {
        let mut arr = DynamicArray::new();
        for i in 0..6 {
            arr.push(Tracked(i, drop_count.clone()));
        }
        println!("Array created with {} elements, capacity {}.", arr.len(), arr.capacity());

        println!("Erasing [1, 3):");
        arr.erase_range(1..3);
        assert_eq!(drop_count.load(Ordering::SeqCst), 2);

        println!("Clearing, capacity stays {}:", arr.capacity());
        arr.clear();
        assert_eq!(drop_count.load(Ordering::SeqCst), 6);

        arr.push(Tracked(99, drop_count.clone()));
        // arr is dropped here together with element 99
    }

    println!("Total elements dropped: {}", drop_count.load(Ordering::SeqCst));
    assert_eq!(drop_count.load(Ordering::SeqCst), 7);
}
