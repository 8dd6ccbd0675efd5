mod test_answering_side;
mod test_offering_side;
