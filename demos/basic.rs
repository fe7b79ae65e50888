use dynamic_array::{DynamicArray, dyn_array};

fn main() {
    println!("--- Basic Usage Example ---");
    let mut arr = DynamicArray::with_capacity(0);

    for i in 1..=5 {
        arr.push(i * 10);
        println!("Pushed: {}, len: {}, cap: {}", i * 10, arr.len(), arr.capacity());
    }

    arr.insert_n(2, 2, 0);
    println!("After insert_n(2, 2, 0): {:?}", arr);

    let next = arr.erase_range(2..4);
    println!("After erase_range(2..4): {:?}, next element: {}", arr, arr[next]);

    let literal = dyn_array![10, 20, 30, 40, 50];
    println!("Equal to literal: {}", arr == literal);

    while let Ok(val) = arr.pop() {
        println!("Popped: {}, len: {}", val, arr.len());
    }

    match arr.back() {
        Ok(val) => println!("Unexpected back: {}", val),
        Err(err) => println!("back() on empty array: {}", err),
    }
}
