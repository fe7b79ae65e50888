use dynamic_array::DynamicArray;
use std::thread;

fn main() {
    println!("--- Cross-thread Ownership Transfer Example ---");
    let mut arr = DynamicArray::new();
    for i in 0..10 {
        arr.push(i);
    }

    println!("Original array (thread main): {:?}", arr);

    // Move ownership to another thread
    let handle = thread::spawn(move || {
        println!("Array in new thread: {:?}", arr);
        arr.push(100);
        arr
    });

    let mut arr = match handle.join() {
        Ok(arr) => arr,
        Err(_) => panic!("worker thread panicked"),
    };
    println!("Array back in main thread: {:?}", arr);

    let mut other = DynamicArray::with_capacity(0);
    arr.swap(&mut other);
    println!("After swap: main {:?}, other has {} elements", arr, other.len());
}
