use npy_array::{Array, ArrayMut, Dtype, Dyn, Endian, Kind, Order, ReadNpyError, WriteNpyError};
use std::fs::File;

fn write_example() -> Result<(), WriteNpyError> {
    let mut arr = ArrayMut::<i32, Dyn>::zeros(vec![2, 3], Order::C).unwrap();
    let values = [1, 2, 3, 4, 5, 6];
    for (i, &value) in values.iter().enumerate() {
        arr.set(&[i / 3, i % 3], value);
    }
    let writer = File::create("array.npy")?;
    arr.write_npy(Dtype::new(Kind::Int32, Endian::NATIVE), writer)?;
    Ok(())
}

fn read_example() -> Result<(), ReadNpyError> {
    let reader = File::open("array.npy")?;
    let arr = Array::<i32, Dyn>::read_npy(reader)?;
    println!("arr (shape {:?}) = {:?}", arr.shape().dims(), arr.as_slice());
    Ok(())
}

fn main() {
    write_example().expect("failure writing array to file");
    read_example().expect("failure reading array from file");
}
